use crate::constants::CURRENT_PROJECT_VERSION;
use crate::error::StoreError;
use crate::models::Project;

/// Serialize a project to bytes with version header
///
/// # Errors
/// Returns an error if `MessagePack` serialization fails
pub fn serialize_project_to_bytes(project: &Project) -> Result<Vec<u8>, StoreError> {
    let project_bytes = rmp_serde::to_vec(project)?;

    // Create versioned format: [4 bytes u32 version][`MessagePack` data]
    let mut bytes = Vec::with_capacity(4 + project_bytes.len());
    bytes.extend_from_slice(&CURRENT_PROJECT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&project_bytes);

    Ok(bytes)
}

/// Deserialize a project from bytes with version header validation
///
/// # Errors
/// Returns an error if the image is truncated, its version is unsupported, or deserialization fails
pub fn deserialize_project_from_bytes(bytes: &[u8]) -> Result<Project, StoreError> {
    if bytes.len() < 4 {
        return Err(StoreError::InvalidImage("too small".to_string()));
    }

    let version_bytes: [u8; 4] = bytes[0..4]
        .try_into()
        .map_err(|_| StoreError::InvalidImage("invalid version header".to_string()))?;
    let version = u32::from_le_bytes(version_bytes);

    if version != CURRENT_PROJECT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    Ok(rmp_serde::from_slice(&bytes[4..])?)
}
