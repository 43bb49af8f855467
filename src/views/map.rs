use std::collections::{HashMap, HashSet};

use super::{route_keys, Page, PageCore, Selectable, ViewId};
use crate::context::DeskContext;
use crate::models::{
    CollectionKey, EntityKinds, EntityRef, GeoPoint, Project, RouteId, Stop, StopObject,
};
use crate::selection::SelectionHub;

/// A selectable point on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapGraphic {
    pub entity: EntityRef,
    pub point: GeoPoint,
}

/// Layer collections handed to the map control, swapped as a whole on refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLayers {
    /// Geocoded unassigned orders
    pub orders: Vec<MapGraphic>,
    /// Unassigned orders that cannot be placed
    pub ungeocoded: usize,
    pub routes: Vec<RouteId>,
    pub stops: Vec<MapGraphic>,
}

#[derive(Debug)]
pub struct MapPage {
    core: PageCore,
    layers: MapLayers,
}

impl MapPage {
    pub fn enter(hub: &mut SelectionHub) -> Self {
        Self {
            core: PageCore::enter(hub, ViewId::Map, EntityKinds::ALL),
            layers: MapLayers::default(),
        }
    }

    #[must_use]
    pub const fn layers(&self) -> &MapLayers {
        &self.layers
    }
}

fn stop_point(project: &Project, stop: &Stop) -> Option<GeoPoint> {
    match stop.object {
        StopObject::Order(order) => project.order(order).and_then(|o| o.point),
        StopObject::Location(location) => project.location(location).and_then(|l| l.point),
    }
}

impl Page for MapPage {
    fn core(&self) -> &PageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PageCore {
        &mut self.core
    }

    fn keys(&self, ctx: &DeskContext, project: &Project) -> Vec<CollectionKey> {
        let mut keys = vec![CollectionKey::Orders];
        keys.extend(route_keys(ctx, project));
        if let Some(schedule) = ctx.schedule {
            keys.push(CollectionKey::Unassigned(schedule));
        }
        keys
    }

    fn rebind(&mut self, ctx: &DeskContext, project: &Project) {
        let mut layers = MapLayers::default();
        let Some(schedule) = ctx.schedule.and_then(|id| project.schedule(id)) else {
            self.layers = layers;
            return;
        };

        for order in schedule.unassigned_orders().filter_map(|id| project.order(id)) {
            match order.point {
                Some(point) => layers.orders.push(MapGraphic {
                    entity: EntityRef::Order(order.id),
                    point,
                }),
                None => layers.ungeocoded += 1,
            }
        }

        let show_hidden = ctx.settings.map_shows_hidden_routes;
        for route in schedule.routes.iter().filter(|r| show_hidden || r.is_visible()) {
            layers.routes.push(route.id);
            layers.stops.extend(route.stops.iter().filter_map(|stop| {
                stop_point(project, stop).map(|point| MapGraphic {
                    entity: EntityRef::Stop(stop.id),
                    point,
                })
            }));
        }

        self.layers = layers;
    }

    fn selectable(&self) -> Selectable {
        let items: HashSet<EntityRef> = self
            .layers
            .orders
            .iter()
            .chain(&self.layers.stops)
            .map(|graphic| graphic.entity)
            .chain(self.layers.routes.iter().copied().map(EntityRef::Route))
            .collect();
        (items, HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scenario;
    use crate::models::{Order, RouteFlags, UserSettings};

    #[test]
    fn test_layers() {
        let mut s = scenario();
        let ungeocoded = s.project.add_order(Order::new("No address", Some(s.day)));
        s.project.set_route_flags(s.r1, RouteFlags::empty());
        let mut hub = SelectionHub::new();
        let mut ctx = DeskContext::new(s.day, UserSettings::default());
        ctx.schedule = Some(s.schedule);

        let mut page = MapPage::enter(&mut hub);
        page.rebind(&ctx, &s.project);
        let layers = page.layers();

        assert_eq!(layers.orders.len(), 3);
        assert_eq!(layers.ungeocoded, 1);
        assert_eq!(layers.routes, vec![s.r2]);
        // Depot location plus both order stops
        assert_eq!(layers.stops.len(), 3);
        assert_eq!(layers.stops[0].point, GeoPoint::new(0.0, 0.0));
        assert!(!page.selectable().0.contains(&EntityRef::Order(ungeocoded)));

        ctx.settings.map_shows_hidden_routes = true;
        page.rebind(&ctx, &s.project);
        assert_eq!(page.layers().routes, vec![s.r1, s.r2]);
    }
}
