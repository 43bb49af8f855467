//! Page coordinators: each page owns one selection participant, its
//! projections and its collection subscriptions.

mod map;
mod orders;
mod routes;
mod subscriptions;
mod time;

pub use map::{MapGraphic, MapLayers, MapPage};
pub use orders::OrdersPage;
pub use routes::{RouteRow, RoutesPage};
pub use subscriptions::{SubscriptionId, SubscriptionRegistry};
pub use time::TimePage;

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::context::DeskContext;
use crate::error::SelectionError;
use crate::models::{CollectionEvent, CollectionKey, EntityKinds, EntityRef, Project, RouteId};
use crate::selection::{ParticipantId, SelectionHub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewId {
    Orders,
    Routes,
    Map,
    Time,
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Orders => "Orders",
            Self::Routes => "Routes",
            Self::Map => "Map",
            Self::Time => "Time",
        };
        f.write_str(name)
    }
}

/// Bookkeeping every page shares
#[derive(Debug)]
pub struct PageCore {
    view: ViewId,
    participant: ParticipantId,
    subscriptions: Vec<SubscriptionId>,
    deliveries: u64,
}

impl PageCore {
    /// Register the page's selection list with the hub
    pub fn enter(hub: &mut SelectionHub, view: ViewId, kinds: EntityKinds) -> Self {
        Self {
            view,
            participant: hub.register(view, kinds),
            subscriptions: Vec::new(),
            deliveries: 0,
        }
    }
}

/// Entities a page can display; detail rows map to their parent route
pub type Selectable = (HashSet<EntityRef>, HashMap<EntityRef, RouteId>);

pub trait Page {
    fn core(&self) -> &PageCore;

    fn core_mut(&mut self) -> &mut PageCore;

    /// Collections the page listens to while showing the context's schedule
    fn keys(&self, ctx: &DeskContext, project: &Project) -> Vec<CollectionKey>;

    /// Rebuild the page's projections from the context's schedule
    fn rebind(&mut self, ctx: &DeskContext, project: &Project);

    fn selectable(&self) -> Selectable;

    /// React to a delivered collection change; rebinding is always correct
    fn on_collection_changed(&mut self, ctx: &DeskContext, project: &Project, _event: &CollectionEvent) {
        self.rebind(ctx, project);
    }

    fn view(&self) -> ViewId {
        self.core().view
    }

    fn participant(&self) -> ParticipantId {
        self.core().participant
    }

    fn subscription_count(&self) -> usize {
        self.core().subscriptions.len()
    }

    /// Number of collection changes delivered to this page
    fn delivery_count(&self) -> u64 {
        self.core().deliveries
    }

    /// Show the context's schedule
    ///
    /// Old subscriptions go first, then projections are rebound, then the new
    /// collections are subscribed and finally the selection is reset.
    ///
    /// # Errors
    /// Returns `UnknownParticipant` if the page already exited
    fn switch_schedule(
        &mut self,
        ctx: &DeskContext,
        project: &Project,
        registry: &mut SubscriptionRegistry,
        hub: &mut SelectionHub,
    ) -> Result<(), SelectionError> {
        self.unsubscribe_all(registry);
        self.rebind(ctx, project);
        self.publish_selectable(hub)?;
        self.subscribe_keys(ctx, project, registry);
        hub.reset();
        Ok(())
    }

    /// Deliver one change and refresh what the hub knows about the page
    ///
    /// # Errors
    /// Returns `UnknownParticipant` if the page already exited
    fn deliver(
        &mut self,
        ctx: &DeskContext,
        project: &Project,
        event: &CollectionEvent,
        registry: &mut SubscriptionRegistry,
        hub: &mut SelectionHub,
    ) -> Result<(), SelectionError> {
        self.core_mut().deliveries += 1;
        self.on_collection_changed(ctx, project, event);
        self.publish_selectable(hub)?;
        // The set of routes may have changed, and with it the stop collections to watch
        if matches!(event.key, CollectionKey::Routes(_)) {
            self.unsubscribe_all(registry);
            self.subscribe_keys(ctx, project, registry);
        }
        Ok(())
    }

    /// # Errors
    /// Returns `UnknownParticipant` if the page already exited
    fn publish_selectable(&self, hub: &mut SelectionHub) -> Result<(), SelectionError> {
        let (items, details) = self.selectable();
        hub.set_items(self.participant(), items, details)
    }

    fn subscribe_keys(&mut self, ctx: &DeskContext, project: &Project, registry: &mut SubscriptionRegistry) {
        let view = self.view();
        let keys = self.keys(ctx, project);
        let core = self.core_mut();
        for key in keys {
            core.subscriptions.push(registry.subscribe(view, key));
        }
    }

    fn unsubscribe_all(&mut self, registry: &mut SubscriptionRegistry) {
        for id in self.core_mut().subscriptions.drain(..) {
            registry.unsubscribe(id);
        }
    }

    /// Remove every subscription and leave the selection hub
    fn exit(&mut self, registry: &mut SubscriptionRegistry, hub: &mut SelectionHub) {
        self.unsubscribe_all(registry);
        hub.unregister(self.participant());
        crate::dev_log!("{} page exited", self.view());
    }
}

/// Keys for a schedule's route collection and each of its routes' stops
fn route_keys(ctx: &DeskContext, project: &Project) -> Vec<CollectionKey> {
    let Some(schedule) = ctx.schedule.and_then(|id| project.schedule(id)) else {
        return Vec::new();
    };
    std::iter::once(CollectionKey::Routes(schedule.id))
        .chain(schedule.routes.iter().map(|route| CollectionKey::Stops(route.id)))
        .collect()
}
