use serde::{Deserialize, Serialize};

use super::{OrderId, RouteId, StopId};

bitflags::bitflags! {
    /// Entity kinds a view is able to display and select
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityKinds: u8 {
        const ORDERS = 0b0000_0001;
        const ROUTES = 0b0000_0010;
        const STOPS  = 0b0000_0100;
        const ALL    = Self::ORDERS.bits() | Self::ROUTES.bits() | Self::STOPS.bits();
    }
}

/// A selectable domain entity, independent of the view that renders it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Order(OrderId),
    Route(RouteId),
    Stop(StopId),
}

impl EntityRef {
    #[must_use]
    pub const fn kind(&self) -> EntityKinds {
        match self {
            Self::Order(_) => EntityKinds::ORDERS,
            Self::Route(_) => EntityKinds::ROUTES,
            Self::Stop(_) => EntityKinds::STOPS,
        }
    }

    #[must_use]
    pub const fn as_order(&self) -> Option<OrderId> {
        match self {
            Self::Order(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_route(&self) -> Option<RouteId> {
        match self {
            Self::Route(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_stop(&self) -> Option<StopId> {
        match self {
            Self::Stop(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<OrderId> for EntityRef {
    fn from(id: OrderId) -> Self {
        Self::Order(id)
    }
}

impl From<RouteId> for EntityRef {
    fn from(id: RouteId) -> Self {
        Self::Route(id)
    }
}

impl From<StopId> for EntityRef {
    fn from(id: StopId) -> Self {
        Self::Stop(id)
    }
}
