use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::{OrderId, Route, RouteId, ScheduleId, Stop, StopId};

/// Kind of a schedule version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleType {
    /// Immutable result of the most recent solver run for the day
    BuildRoutesSnapshot,
    /// The committed schedule of the day
    Current,
    /// User-created working copy
    Edited,
}

impl ScheduleType {
    /// Whether versions of this type may be renamed or deleted
    #[must_use]
    pub const fn is_user_editable(self) -> bool {
        matches!(self, Self::Edited)
    }
}

/// Orders of a schedule's day that no stop references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnassignedOrders {
    orders: IndexSet<OrderId>,
}

impl UnassignedOrders {
    #[must_use]
    pub fn new(orders: impl IntoIterator<Item = OrderId>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, order: OrderId) -> bool {
        self.orders.contains(&order)
    }

    pub fn insert(&mut self, order: OrderId) -> bool {
        self.orders.insert(order)
    }

    pub fn remove(&mut self, order: OrderId) -> bool {
        self.orders.shift_remove(&order)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }
}

/// Where a stop sits within a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPosition {
    pub route: RouteId,
    pub index: usize,
}

/// A dated, typed container of routes plus the day's unassigned orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub planned_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub kind: ScheduleType,
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Disposed (set to `None`) when the schedule is deleted
    #[serde(default)]
    pub unassigned: Option<UnassignedOrders>,
}

impl Schedule {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        planned_date: NaiveDate,
        kind: ScheduleType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ScheduleId::new(),
            name: name.into(),
            planned_date,
            created_at,
            kind,
            routes: Vec::new(),
            unassigned: Some(UnassignedOrders::default()),
        }
    }

    /// Clone this schedule as a new version with fresh schedule, route and stop ids
    ///
    /// Orders are shared with the source; only their assignment is copied.
    #[must_use]
    pub fn clone_as(&self, name: impl Into<String>, kind: ScheduleType, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ScheduleId::new(),
            name: name.into(),
            planned_date: self.planned_date,
            created_at,
            kind,
            routes: self.routes.iter().map(Route::duplicate).collect(),
            unassigned: Some(self.unassigned.clone().unwrap_or_default()),
        }
    }

    #[must_use]
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn route_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.routes.iter_mut().find(|r| r.id == id)
    }

    #[must_use]
    pub fn find_stop(&self, stop: StopId) -> Option<StopPosition> {
        self.routes.iter().find_map(|route| {
            route
                .stop_index(stop)
                .map(|index| StopPosition { route: route.id, index })
        })
    }

    #[must_use]
    pub fn stop(&self, stop: StopId) -> Option<&Stop> {
        self.routes.iter().find_map(|route| route.stop(stop))
    }

    /// Stop that currently serves `order`, if any
    #[must_use]
    pub fn stop_for_order(&self, order: OrderId) -> Option<&Stop> {
        self.routes
            .iter()
            .flat_map(|route| route.stops.iter())
            .find(|stop| stop.object.order() == Some(order))
    }

    #[must_use]
    pub fn is_unassigned(&self, order: OrderId) -> bool {
        self.unassigned.as_ref().is_some_and(|u| u.contains(order))
    }

    pub fn unassigned_orders(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.unassigned.iter().flat_map(UnassignedOrders::iter)
    }

    /// Release the unassigned-orders resource
    pub fn dispose_unassigned(&mut self) -> Option<UnassignedOrders> {
        self.unassigned.take()
    }

    /// Remove the given stops from whatever routes hold them, in payload order
    ///
    /// Returns the detached stops with the route each came from. Unknown ids are skipped.
    pub fn detach_stops(&mut self, stops: &[StopId]) -> Vec<(RouteId, Stop)> {
        let mut detached = Vec::with_capacity(stops.len());
        for &stop in stops {
            let Some(pos) = self.find_stop(stop) else { continue };
            if let Some(route) = self.route_mut(pos.route) {
                detached.push((pos.route, route.stops.remove(pos.index)));
            }
        }
        detached
    }
}
