//! Typed identifiers for domain entities
//!
//! Every entity gets its own id type so an order id can never be handed to a
//! route lookup. All ids are random v4 UUIDs.
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random id
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies an [`Order`](super::Order)
    OrderId
);
entity_id!(
    /// Identifies a [`Route`](super::Route)
    RouteId
);
entity_id!(
    /// Identifies a [`Stop`](super::Stop)
    StopId
);
entity_id!(
    /// Identifies a [`Schedule`](super::Schedule)
    ScheduleId
);
entity_id!(LocationId);
entity_id!(ZoneId);
