//! Schedule versions of a day: naming, display order and lifecycle.

mod manager;
mod naming;
mod ordering;

pub use manager::VersionManager;
pub use naming::{latest_version_index, next_version_name, version_name};
pub use ordering::{compare_versions, sort_versions};
