/// Delay before a drag hovering a collapsed route expands its stop rows
pub const DRAG_EXPAND_DWELL_MS: i64 = 750;

/// Base name of user-created schedule versions ("Edited", "Edited 1", ...)
pub const EDITED_VERSION_BASE_NAME: &str = "Edited";

/// Fixed display name of the committed schedule of a day
pub const CURRENT_VERSION_NAME: &str = "Current";

/// Fixed display name of the schedule produced by the last solver run
pub const SNAPSHOT_VERSION_NAME: &str = "Build Routes Snapshot";

/// Prefix for auto-generated route names ("Route 1", "Route 2", ...)
pub const DEFAULT_ROUTE_NAME_PREFIX: &str = "Route";

/// Prefix for auto-generated order names
pub const DEFAULT_ORDER_NAME_PREFIX: &str = "Order";

/// Version header written in front of every serialized project image
pub const CURRENT_PROJECT_VERSION: u32 = 1;
