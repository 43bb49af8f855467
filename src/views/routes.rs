use std::collections::{HashMap, HashSet};

use super::{route_keys, Page, PageCore, Selectable, ViewId};
use crate::context::DeskContext;
use crate::models::{CollectionKey, EntityKinds, EntityRef, OrderId, Project, RouteId, StopId};
use crate::selection::SelectionHub;

/// One row of the routes grid with its stop detail rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    pub route: RouteId,
    pub name: String,
    pub locked: bool,
    pub visible: bool,
    pub stops: Vec<StopId>,
}

/// Routes grid plus the grid of the schedule's unassigned orders
#[derive(Debug)]
pub struct RoutesPage {
    core: PageCore,
    rows: Vec<RouteRow>,
    unassigned: Vec<OrderId>,
}

impl RoutesPage {
    pub fn enter(hub: &mut SelectionHub) -> Self {
        Self {
            core: PageCore::enter(hub, ViewId::Routes, EntityKinds::ALL),
            rows: Vec::new(),
            unassigned: Vec::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[RouteRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, route: RouteId) -> Option<&RouteRow> {
        self.rows.iter().find(|row| row.route == route)
    }

    #[must_use]
    pub fn unassigned(&self) -> &[OrderId] {
        &self.unassigned
    }
}

impl Page for RoutesPage {
    fn core(&self) -> &PageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PageCore {
        &mut self.core
    }

    fn keys(&self, ctx: &DeskContext, project: &Project) -> Vec<CollectionKey> {
        let mut keys = route_keys(ctx, project);
        if let Some(schedule) = ctx.schedule {
            keys.push(CollectionKey::Unassigned(schedule));
        }
        keys
    }

    fn rebind(&mut self, ctx: &DeskContext, project: &Project) {
        let schedule = ctx.schedule.and_then(|id| project.schedule(id));
        self.rows = schedule
            .map(|schedule| {
                schedule
                    .routes
                    .iter()
                    .map(|route| RouteRow {
                        route: route.id,
                        name: route.name.clone(),
                        locked: route.is_locked(),
                        visible: route.is_visible(),
                        stops: route.stop_ids(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.unassigned = schedule
            .map(|schedule| schedule.unassigned_orders().collect())
            .unwrap_or_default();
    }

    fn selectable(&self) -> Selectable {
        let items: HashSet<EntityRef> = self
            .rows
            .iter()
            .map(|row| EntityRef::Route(row.route))
            .chain(self.unassigned.iter().copied().map(EntityRef::Order))
            .collect();
        let details: HashMap<EntityRef, RouteId> = self
            .rows
            .iter()
            .flat_map(|row| row.stops.iter().map(move |stop| (EntityRef::Stop(*stop), row.route)))
            .collect();
        (items, details)
    }
}
