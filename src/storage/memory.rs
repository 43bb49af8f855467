use super::{deserialize_project_from_bytes, serialize_project_to_bytes, ProjectStore};
use crate::error::StoreError;
use crate::models::Project;

/// Keeps the last saved project image in memory
///
/// Saves can be made to fail on purpose to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    image: Option<Vec<u8>>,
    saves: usize,
    fail_next: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` saves fail
    pub fn fail_next_saves(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// Number of successful saves
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, project: &Project) -> Result<(), StoreError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            log::error!("Rejecting save of project {:?}", project.name);
            return Err(StoreError::Rejected("injected failure".to_string()));
        }

        let bytes = serialize_project_to_bytes(project)?;
        self.image = Some(bytes);
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<Project>, StoreError> {
        self.image
            .as_deref()
            .map(deserialize_project_from_bytes)
            .transpose()
    }
}
