//! Localized string resources.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Resource id of the module display name.
pub const MODULE_NAME_RESOURCE: &str = "IDS_CONTEXT_MENU_ITEM_NEW";

/// Looks up localized strings by resource id.
pub trait ResourceLoader: Send + Sync {
    /// Localized string for `id`, if available.
    fn lookup(&self, id: &str) -> Option<String>;
}

/// Resolve `id`, falling back to `fallback` when lookup is unavailable or empty.
pub fn resolve(loader: Option<&dyn ResourceLoader>, id: &str, fallback: &str) -> String {
    loader
        .and_then(|l| l.lookup(id))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Table of localized strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceTable {
    /// Locale tag, e.g. `en-US`
    #[serde(default)]
    pub locale: String,
    /// Strings by resource id
    #[serde(default)]
    pub strings: HashMap<String, String>,
}

impl ResourceTable {
    /// Create an empty table for `locale`.
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            strings: HashMap::new(),
        }
    }

    /// Add a string.
    pub fn with_string(mut self, id: &str, value: &str) -> Self {
        self.strings.insert(id.to_string(), value.to_string());
        self
    }

    /// Parse a table from JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Resource(e.to_string()))
    }

    /// Load a table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Resource(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }
}

impl ResourceLoader for ResourceTable {
    fn lookup(&self, id: &str) -> Option<String> {
        self.strings.get(id).cloned()
    }
}
