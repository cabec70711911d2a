//! File-backed settings store.
//!
//! Reads the same files the settings editor writes:
//!
//! ```text
//! <root>/settings.json        {"enabled": {"NewPlus": true, ...}}
//! <root>/<key>/settings.json  {"properties": {"template_location": {"value": "..."}}}
//! ```
//!
//! Files are re-read on every call; nothing is cached.

use crate::core::{Error, Result};
use crate::settings::store::SettingsStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Property key of the template location.
pub const TEMPLATE_LOCATION_PROPERTY: &str = "template_location";
/// Property key of the hide-file-extension flag.
pub const HIDE_FILE_EXTENSION_PROPERTY: &str = "hide_file_extension";

/// General settings shared by all modules of a host.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Enabled flag per module key
    #[serde(default)]
    pub enabled: HashMap<String, bool>,
}

/// A single property wrapper, `{"value": ...}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Property {
    /// Property value
    pub value: serde_json::Value,
}

/// Per-module settings file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Module name as written by the editor
    #[serde(default)]
    pub name: String,
    /// Schema version as written by the editor
    #[serde(default)]
    pub version: String,
    /// Named properties
    #[serde(default)]
    pub properties: HashMap<String, Property>,
}

impl ModuleSettings {
    /// String property value, if present and a string.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|p| p.value.as_str())
    }

    /// Boolean property value, if present and a bool.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(|p| p.value.as_bool())
    }
}

/// Settings store backed by the editor's JSON files.
#[derive(Clone, Debug)]
pub struct JsonSettingsStore {
    root: PathBuf,
    module_key: String,
    default_template_location: String,
}

impl JsonSettingsStore {
    /// Create a store rooted at `root` for the module `module_key`.
    pub fn new(root: impl Into<PathBuf>, module_key: &str, default_template_location: &str) -> Self {
        Self {
            root: root.into(),
            module_key: module_key.to_string(),
            default_template_location: default_template_location.to_string(),
        }
    }

    /// Path of the general settings file.
    pub fn general_settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Path of this module's settings file.
    pub fn module_settings_path(&self) -> PathBuf {
        self.root.join(&self.module_key).join("settings.json")
    }

    /// Load general settings; a missing file yields defaults.
    pub fn load_general(&self) -> Result<GeneralSettings> {
        read_json_or_default(&self.general_settings_path())
    }

    /// Load module settings; a missing file yields defaults.
    pub fn load_module(&self) -> Result<ModuleSettings> {
        read_json_or_default(&self.module_settings_path())
    }
}

fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(Error::SettingsRead(format!("{}: {}", path.display(), e)));
        }
    };
    serde_json::from_str(&raw)
        .map_err(|e| Error::SettingsParse(format!("{}: {}", path.display(), e)))
}

impl SettingsStore for JsonSettingsStore {
    fn enabled(&self) -> Result<bool> {
        let general = self.load_general()?;
        Ok(general.enabled.get(&self.module_key).copied().unwrap_or(false))
    }

    fn template_location(&self) -> Result<String> {
        let settings = self.load_module()?;
        Ok(settings
            .string(TEMPLATE_LOCATION_PROPERTY)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_template_location.as_str())
            .to_string())
    }

    fn hide_file_extension(&self) -> Result<bool> {
        let settings = self.load_module()?;
        Ok(settings.bool(HIDE_FILE_EXTENSION_PROPERTY).unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, value: serde_json::Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_missing_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path(), "NewPlus", "C:\\Default");

        assert!(!store.enabled().unwrap());
        assert_eq!(store.template_location().unwrap(), "C:\\Default");
        assert!(store.hide_file_extension().unwrap());
    }

    #[test]
    fn test_reads_editor_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path(), "NewPlus", "C:\\Default");

        write(
            &store.general_settings_path(),
            serde_json::json!({"enabled": {"NewPlus": true, "Peek": false}}),
        );
        write(
            &store.module_settings_path(),
            serde_json::json!({
                "name": "NewPlus",
                "version": "1.0",
                "properties": {
                    "template_location": {"value": "C:\\Templates"},
                    "hide_file_extension": {"value": false}
                }
            }),
        );

        assert!(store.enabled().unwrap());
        assert_eq!(store.template_location().unwrap(), "C:\\Templates");
        assert!(!store.hide_file_extension().unwrap());
    }

    #[test]
    fn test_rereads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path(), "NewPlus", "C:\\Default");

        let path = store.module_settings_path();
        write(
            &path,
            serde_json::json!({"properties": {"template_location": {"value": "C:\\One"}}}),
        );
        assert_eq!(store.template_location().unwrap(), "C:\\One");

        write(
            &path,
            serde_json::json!({"properties": {"template_location": {"value": "C:\\Two"}}}),
        );
        assert_eq!(store.template_location().unwrap(), "C:\\Two");
    }

    #[test]
    fn test_empty_location_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path(), "NewPlus", "C:\\Default");
        write(
            &store.module_settings_path(),
            serde_json::json!({"properties": {"template_location": {"value": ""}}}),
        );

        assert_eq!(store.template_location().unwrap(), "C:\\Default");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path(), "NewPlus", "C:\\Default");
        std::fs::write(store.general_settings_path(), "{not json").unwrap();

        assert!(matches!(store.enabled(), Err(Error::SettingsParse(_))));
    }
}
