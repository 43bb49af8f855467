mod file;
mod memory;

pub use file::{deserialize_project_from_bytes, serialize_project_to_bytes};
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::Project;

/// Persistence backend for the project
///
/// `save` must be atomic: on error nothing of the new state is persisted.
pub trait ProjectStore {
    /// Persist the full project
    ///
    /// # Errors
    /// Returns an error if the project could not be written
    fn save(&mut self, project: &Project) -> Result<(), StoreError>;

    /// Load the last saved project, `None` if nothing was saved yet
    ///
    /// # Errors
    /// Returns an error if the stored image is unreadable
    fn load(&self) -> Result<Option<Project>, StoreError>;
}
