#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

mod logging;

pub mod constants;
pub mod context;
pub mod deferred;
pub mod desk;
pub mod dnd;
pub mod error;
pub mod gantt;
pub mod geometry;
pub mod models;
pub mod selection;
pub mod storage;
pub mod time;
pub mod versions;
pub mod views;

#[cfg(test)]
mod fixtures;

pub use context::DeskContext;
pub use desk::Desk;
pub use error::{DropRejection, SelectionError, SettingsError, StoreError, VersionError};
