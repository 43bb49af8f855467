use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    CURRENT_VERSION_NAME, DEFAULT_ORDER_NAME_PREFIX, DEFAULT_ROUTE_NAME_PREFIX,
    DRAG_EXPAND_DWELL_MS, EDITED_VERSION_BASE_NAME, SNAPSHOT_VERSION_NAME,
};
use crate::error::SettingsError;

/// Dispatcher settings that persist across projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Hover time before a dragged-over route expands its stop rows
    pub drag_expand_dwell_ms: i64,
    pub edited_version_base_name: String,
    pub current_version_name: String,
    pub snapshot_version_name: String,
    pub default_route_prefix: String,
    pub default_order_prefix: String,
    /// Show routes hidden in the grid on the map as well
    pub map_shows_hidden_routes: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            drag_expand_dwell_ms: DRAG_EXPAND_DWELL_MS,
            edited_version_base_name: EDITED_VERSION_BASE_NAME.to_string(),
            current_version_name: CURRENT_VERSION_NAME.to_string(),
            snapshot_version_name: SNAPSHOT_VERSION_NAME.to_string(),
            default_route_prefix: DEFAULT_ROUTE_NAME_PREFIX.to_string(),
            default_order_prefix: DEFAULT_ORDER_NAME_PREFIX.to_string(),
            map_shows_hidden_routes: false,
        }
    }
}

impl UserSettings {
    /// Create new settings with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn drag_expand_dwell(&self) -> Duration {
        Duration::milliseconds(self.drag_expand_dwell_ms.max(0))
    }

    /// Parse settings from JSON, filling missing fields with defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load user settings from a JSON file
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Save user settings to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = UserSettings::new();
        assert_eq!(settings.drag_expand_dwell(), Duration::milliseconds(750));
        assert_eq!(settings.edited_version_base_name, "Edited");
        assert_eq!(settings.current_version_name, "Current");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = UserSettings::from_json(r#"{"drag_expand_dwell_ms": 300}"#).expect("valid json");
        assert_eq!(settings.drag_expand_dwell(), Duration::milliseconds(300));
        assert_eq!(settings.default_route_prefix, "Route");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(UserSettings::from_json("{"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("route_desk_missing_{}.json", uuid::Uuid::new_v4()));
        assert_eq!(UserSettings::load(&path).expect("defaults"), UserSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("route_desk_settings_{}.json", uuid::Uuid::new_v4()));
        let settings = UserSettings {
            drag_expand_dwell_ms: 500,
            ..UserSettings::default()
        };
        settings.save(&path).expect("settings should save");
        let loaded = UserSettings::load(&path).expect("settings should load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }
}
