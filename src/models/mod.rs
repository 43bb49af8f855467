mod entity;
mod events;
mod id;
mod location;
mod order;
mod project;
mod route;
mod schedule;
mod stop;
mod user_settings;
mod zone;

pub use entity::{EntityKinds, EntityRef};
pub use events::{ChangeLog, CollectionChange, CollectionEvent, CollectionKey};
pub use id::{LocationId, OrderId, RouteId, ScheduleId, StopId, ZoneId};
pub use location::{GeoPoint, Location};
pub use order::Order;
pub use project::Project;
pub use route::{generate_route_color, next_default_name, next_default_route_name, Route, RouteFlags};
pub use schedule::{Schedule, ScheduleType, StopPosition, UnassignedOrders};
pub use stop::{Stop, StopObject};
pub use user_settings::UserSettings;
pub use zone::Zone;
