use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{LocationId, OrderId, StopId};
use crate::time::duration_serde;

/// The object a stop visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopObject {
    Order(OrderId),
    Location(LocationId),
}

impl StopObject {
    #[must_use]
    pub const fn order(&self) -> Option<OrderId> {
        match self {
            Self::Order(id) => Some(*id),
            Self::Location(_) => None,
        }
    }
}

/// A position within a route's sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub object: StopObject,
    /// Planned arrival, filled in by the solver
    #[serde(default)]
    pub arrive_time: Option<NaiveDateTime>,
    #[serde(with = "duration_serde")]
    pub service: Duration,
}

impl Stop {
    #[must_use]
    pub fn for_order(order: OrderId, service: Duration) -> Self {
        Self {
            id: StopId::new(),
            object: StopObject::Order(order),
            arrive_time: None,
            service,
        }
    }

    #[must_use]
    pub fn for_location(location: LocationId) -> Self {
        Self {
            id: StopId::new(),
            object: StopObject::Location(location),
            arrive_time: None,
            service: Duration::zero(),
        }
    }

    #[must_use]
    pub fn with_arrival(mut self, arrive_time: NaiveDateTime) -> Self {
        self.arrive_time = Some(arrive_time);
        self
    }

    /// Planned departure, if the arrival is known
    #[must_use]
    pub fn depart_time(&self) -> Option<NaiveDateTime> {
        self.arrive_time.map(|arrive| arrive + self.service)
    }

    /// Copy of this stop under a fresh id
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: StopId::new(),
            ..self.clone()
        }
    }
}
