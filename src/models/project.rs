use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    ChangeLog, CollectionEvent, CollectionKey, EntityRef, GeoPoint, Location, LocationId, Order,
    OrderId, Route, RouteFlags, RouteId, Schedule, ScheduleId, ScheduleType, Stop, StopId,
    UnassignedOrders, Zone, ZoneId,
};

/// The persisted object graph: orders, locations, zones and schedule versions
///
/// Every structural mutation records a [`CollectionEvent`]; owners drain them
/// with [`Project::drain_events`] and forward them to subscribed views.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    orders: IndexMap<OrderId, Order>,
    #[serde(default)]
    locations: IndexMap<LocationId, Location>,
    #[serde(default)]
    zones: IndexMap<ZoneId, Zone>,
    #[serde(default)]
    schedules: IndexMap<ScheduleId, Schedule>,
    #[serde(skip)]
    events: ChangeLog,
}

impl Project {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // Orders

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Orders planned for `date`
    pub fn orders_on(&self, date: NaiveDate) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(move |o| o.planned_date == Some(date))
    }

    /// Add an order; it becomes unassigned in every schedule of its planned day
    pub fn add_order(&mut self, order: Order) -> OrderId {
        let id = order.id;
        let planned = order.planned_date;
        self.orders.insert(id, order);
        self.events.record(CollectionEvent::added(CollectionKey::Orders, vec![EntityRef::Order(id)]));

        if let Some(date) = planned {
            for schedule in self.schedules.values_mut().filter(|s| s.planned_date == date) {
                if let Some(unassigned) = schedule.unassigned.as_mut() {
                    unassigned.insert(id);
                    self.events.record(CollectionEvent::added(
                        CollectionKey::Unassigned(schedule.id),
                        vec![EntityRef::Order(id)],
                    ));
                }
            }
        }
        id
    }

    /// Remove an order together with every stop that serves it
    pub fn remove_order(&mut self, id: OrderId) -> Option<Order> {
        let order = self.orders.shift_remove(&id)?;

        for schedule in self.schedules.values_mut() {
            for route in &mut schedule.routes {
                let removed: Vec<EntityRef> = route
                    .stops
                    .iter()
                    .filter(|s| s.object.order() == Some(id))
                    .map(|s| EntityRef::Stop(s.id))
                    .collect();
                if !removed.is_empty() {
                    route.stops.retain(|s| s.object.order() != Some(id));
                    self.events.record(CollectionEvent::removed(CollectionKey::Stops(route.id), removed));
                }
            }
            if schedule.unassigned.as_mut().is_some_and(|u| u.remove(id)) {
                self.events.record(CollectionEvent::removed(
                    CollectionKey::Unassigned(schedule.id),
                    vec![EntityRef::Order(id)],
                ));
            }
        }

        self.events.record(CollectionEvent::removed(CollectionKey::Orders, vec![EntityRef::Order(id)]));
        Some(order)
    }

    pub fn set_order_name(&mut self, id: OrderId, name: impl Into<String>) -> bool {
        let Some(order) = self.orders.get_mut(&id) else { return false };
        order.name = name.into();
        self.events.record(CollectionEvent::reset(CollectionKey::Orders));
        true
    }

    /// Store a geocoding result
    pub fn set_order_point(&mut self, id: OrderId, point: Option<GeoPoint>) -> bool {
        let Some(order) = self.orders.get_mut(&id) else { return false };
        order.point = point;
        self.events.record(CollectionEvent::reset(CollectionKey::Orders));
        true
    }

    // Locations and zones

    pub fn add_location(&mut self, location: Location) -> LocationId {
        let id = location.id;
        self.locations.insert(id, location);
        id
    }

    #[must_use]
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn add_zone(&mut self, zone: Zone) -> ZoneId {
        let id = zone.id;
        self.zones.insert(id, zone);
        id
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    // Schedules

    pub fn schedules(&self) -> impl Iterator<Item = &Schedule> {
        self.schedules.values()
    }

    #[must_use]
    pub fn schedule(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules.get(&id)
    }

    pub fn schedules_on(&self, date: NaiveDate) -> impl Iterator<Item = &Schedule> {
        self.schedules.values().filter(move |s| s.planned_date == date)
    }

    /// The Current schedule of `date`, if one exists
    #[must_use]
    pub fn current_schedule(&self, date: NaiveDate) -> Option<&Schedule> {
        self.schedules_on(date).find(|s| s.kind == ScheduleType::Current)
    }

    pub fn add_schedule(&mut self, schedule: Schedule) -> ScheduleId {
        let id = schedule.id;
        let date = schedule.planned_date;
        self.schedules.insert(id, schedule);
        self.events.record(CollectionEvent::reset(CollectionKey::Schedules(date)));
        id
    }

    pub fn remove_schedule(&mut self, id: ScheduleId) -> Option<Schedule> {
        let schedule = self.schedules.shift_remove(&id)?;
        self.events.record(CollectionEvent::reset(CollectionKey::Schedules(schedule.planned_date)));
        self.events.record(CollectionEvent::reset(CollectionKey::Routes(id)));
        Some(schedule)
    }

    pub fn rename_schedule(&mut self, id: ScheduleId, name: impl Into<String>) -> bool {
        let Some(schedule) = self.schedules.get_mut(&id) else { return false };
        schedule.name = name.into();
        self.events.record(CollectionEvent::reset(CollectionKey::Schedules(schedule.planned_date)));
        true
    }

    /// Release a schedule's unassigned-orders resource ahead of its removal
    pub fn dispose_unassigned(&mut self, id: ScheduleId) -> Option<UnassignedOrders> {
        let disposed = self.schedules.get_mut(&id)?.dispose_unassigned()?;
        self.events.record(CollectionEvent::reset(CollectionKey::Unassigned(id)));
        Some(disposed)
    }

    /// Replace a schedule with an edited copy in one step
    ///
    /// `events` describe the difference between the stored and the staged schedule.
    pub fn commit_schedule(&mut self, staged: Schedule, events: Vec<CollectionEvent>) -> bool {
        let Some(slot) = self.schedules.get_mut(&staged.id) else { return false };
        *slot = staged;
        self.events.extend(events);
        true
    }

    // Routes and stops

    /// Find a route in any schedule
    #[must_use]
    pub fn find_route(&self, id: RouteId) -> Option<(ScheduleId, &Route)> {
        self.schedules
            .values()
            .find_map(|s| s.route(id).map(|route| (s.id, route)))
    }

    /// Find a stop in any schedule
    #[must_use]
    pub fn find_stop(&self, id: StopId) -> Option<(ScheduleId, RouteId, &Stop)> {
        self.schedules.values().find_map(|s| {
            s.routes
                .iter()
                .find_map(|route| route.stop(id).map(|stop| (s.id, route.id, stop)))
        })
    }

    pub fn add_route(&mut self, schedule: ScheduleId, route: Route) -> Option<RouteId> {
        let target = self.schedules.get_mut(&schedule)?;
        let id = route.id;
        target.routes.push(route);
        self.events.record(CollectionEvent::added(CollectionKey::Routes(schedule), vec![EntityRef::Route(id)]));
        Some(id)
    }

    /// Remove a route; the orders its stops served become unassigned
    pub fn remove_route(&mut self, schedule: ScheduleId, route: RouteId) -> Option<Route> {
        let target = self.schedules.get_mut(&schedule)?;
        let index = target.routes.iter().position(|r| r.id == route)?;
        let removed = target.routes.remove(index);

        let released: Vec<EntityRef> = removed
            .stops
            .iter()
            .filter_map(|s| s.object.order())
            .filter(|order| target.unassigned.as_mut().is_some_and(|u| u.insert(*order)))
            .map(EntityRef::Order)
            .collect();

        self.events.record(CollectionEvent::removed(CollectionKey::Routes(schedule), vec![EntityRef::Route(route)]));
        self.events.record(CollectionEvent::removed(
            CollectionKey::Stops(route),
            removed.stops.iter().map(|s| EntityRef::Stop(s.id)).collect(),
        ));
        self.events.record(CollectionEvent::added(CollectionKey::Unassigned(schedule), released));
        Some(removed)
    }

    pub fn set_route_name(&mut self, route: RouteId, name: impl Into<String>) -> bool {
        let Some(schedule) = self.find_route(route).map(|(s, _)| s) else { return false };
        if let Some(target) = self.route_mut(route) {
            target.name = name.into();
        }
        self.events.record(CollectionEvent::reset(CollectionKey::Routes(schedule)));
        true
    }

    /// Change lock/visibility/zone flags of a route
    pub fn set_route_flags(&mut self, route: RouteId, flags: RouteFlags) -> bool {
        let Some(schedule) = self.find_route(route).map(|(s, _)| s) else { return false };
        if let Some(target) = self.route_mut(route) {
            target.flags = flags;
        }
        self.events.record(CollectionEvent::reset(CollectionKey::Routes(schedule)));
        true
    }

    fn route_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.schedules.values_mut().find_map(|s| s.route_mut(id))
    }

    // Events

    pub fn drain_events(&mut self) -> Vec<CollectionEvent> {
        self.events.drain()
    }

    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}
