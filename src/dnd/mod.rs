//! Drag-and-drop reassignment of orders and stops between routes.

mod dwell;
mod engine;
mod payload;
mod target;

pub use dwell::{DragSession, DwellTimer};
pub use engine::{check_drop, drop, is_drag_allowed, is_drop_allowed, DropOutcome};
pub use payload::DragPayload;
pub use target::{DropPosition, DropTarget, HitTarget};
