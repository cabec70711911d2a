//! Module configuration.
//!
//! Where the module finds its settings, policy and resources.

use crate::core::{Error, Result};
use crate::monitoring::LoggingConfig;
use crate::package::RegistrationCommand;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Machine key of the New+ module. Must match the key the settings editor uses.
pub const MODULE_KEY: &str = "NewPlus";

/// New+ module configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Machine key namespacing the module's settings
    pub module_key: String,
    /// Root directory of the host's settings files
    pub settings_root: PathBuf,
    /// Template location used when the settings file has none
    pub default_template_location: String,
    /// Localized resource table (JSON), if any
    pub resources_file: Option<PathBuf>,
    /// Policy values file (JSON), if any
    pub policy_file: Option<PathBuf>,
    /// Package registration command, if any
    pub registration: Option<RegistrationCommand>,
    /// Logging setup
    pub logging: LoggingConfig,
}

impl ModuleConfig {
    /// Config rooted at `settings_root` with everything else defaulted.
    pub fn with_settings_root(settings_root: impl Into<PathBuf>) -> Self {
        let settings_root = settings_root.into();
        let default_template_location = default_template_location(&settings_root);
        Self {
            settings_root,
            default_template_location,
            ..Default::default()
        }
    }

    /// Parse from JSON and validate.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Check the config is usable.
    pub fn validate(&self) -> Result<()> {
        if self.module_key.trim().is_empty() {
            return Err(Error::InvalidConfig("module_key must not be empty".to_string()));
        }
        if self.settings_root.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("settings_root must not be empty".to_string()));
        }
        if let Some(command) = &self.registration {
            if command.program.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "registration.program must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn default_template_location(settings_root: &Path) -> String {
    settings_root
        .join(MODULE_KEY)
        .join("Templates")
        .to_string_lossy()
        .into_owned()
}

/// Defaults root the settings at the relative directory `settings`, resolved
/// against the process working directory.
impl Default for ModuleConfig {
    fn default() -> Self {
        let settings_root = PathBuf::from("settings");
        Self {
            module_key: MODULE_KEY.to_string(),
            default_template_location: default_template_location(&settings_root),
            settings_root,
            resources_file: None,
            policy_file: None,
            registration: None,
            logging: LoggingConfig::default(),
        }
    }
}
