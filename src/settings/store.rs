//! SettingsStore trait definition.
//!
//! The durable module settings are owned by an external editor; modules only
//! read them through this trait.

use crate::core::{Error, Result};
use std::sync::RwLock;

/// Read-only view of a module's durable settings.
pub trait SettingsStore: Send + Sync {
    /// Whether the module is enabled in the persisted settings.
    fn enabled(&self) -> Result<bool>;

    /// Current template location.
    fn template_location(&self) -> Result<String>;

    /// Whether file extensions are hidden when materializing templates.
    fn hide_file_extension(&self) -> Result<bool> {
        Ok(true)
    }
}

/// In-memory settings, for hosts that own persistence themselves and for tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    enabled: RwLock<bool>,
    template_location: RwLock<String>,
    hide_file_extension: RwLock<bool>,
}

impl MemorySettingsStore {
    /// Create a store with the given values.
    pub fn new(enabled: bool, template_location: &str) -> Self {
        Self {
            enabled: RwLock::new(enabled),
            template_location: RwLock::new(template_location.to_string()),
            hide_file_extension: RwLock::new(true),
        }
    }

    /// Overwrite the enabled flag, as the external editor would.
    pub fn set_enabled(&self, enabled: bool) {
        if let Ok(mut value) = self.enabled.write() {
            *value = enabled;
        }
    }

    /// Overwrite the template location, as the external editor would.
    pub fn set_template_location(&self, location: &str) {
        if let Ok(mut value) = self.template_location.write() {
            *value = location.to_string();
        }
    }

    /// Overwrite the hide-extension flag.
    pub fn set_hide_file_extension(&self, hide: bool) {
        if let Ok(mut value) = self.hide_file_extension.write() {
            *value = hide;
        }
    }
}

fn poisoned(what: &str) -> Error {
    Error::SettingsRead(format!("{} lock poisoned", what))
}

impl SettingsStore for MemorySettingsStore {
    fn enabled(&self) -> Result<bool> {
        self.enabled.read().map(|v| *v).map_err(|_| poisoned("enabled"))
    }

    fn template_location(&self) -> Result<String> {
        self.template_location
            .read()
            .map(|v| v.clone())
            .map_err(|_| poisoned("template_location"))
    }

    fn hide_file_extension(&self) -> Result<bool> {
        self.hide_file_extension
            .read()
            .map(|v| *v)
            .map_err(|_| poisoned("hide_file_extension"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_values() {
        let store = MemorySettingsStore::new(true, "C:\\Templates");
        assert!(store.enabled().unwrap());
        assert_eq!(store.template_location().unwrap(), "C:\\Templates");
        assert!(store.hide_file_extension().unwrap());
    }

    #[test]
    fn test_memory_store_updates() {
        let store = MemorySettingsStore::default();
        assert!(!store.enabled().unwrap());
        assert_eq!(store.template_location().unwrap(), "");

        store.set_enabled(true);
        store.set_template_location("D:\\Other");
        store.set_hide_file_extension(false);

        assert!(store.enabled().unwrap());
        assert_eq!(store.template_location().unwrap(), "D:\\Other");
        assert!(!store.hide_file_extension().unwrap());
    }
}
