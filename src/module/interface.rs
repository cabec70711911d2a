//! Module interface definition.
//!
//! Defines the surface a host uses to drive a pluggable module.

use crate::policy::PolicyDecision;
use serde::{Deserialize, Serialize};

/// Display name and machine key of a module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleIdentity {
    /// Localized display name
    pub name: String,
    /// Stable machine key
    pub key: String,
}

impl ModuleIdentity {
    /// Create a new identity.
    pub fn new(name: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
        }
    }
}

/// Why a configuration write was ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The document is not valid JSON
    Malformed(String),
    /// A required field is absent or has the wrong type
    MissingField(String),
    /// Current settings could not be read for comparison
    SettingsUnavailable(String),
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::Malformed(msg) => write!(f, "malformed document: {}", msg),
            IgnoreReason::MissingField(field) => write!(f, "missing field: {}", field),
            IgnoreReason::SettingsUnavailable(msg) => write!(f, "settings unavailable: {}", msg),
        }
    }
}

/// Outcome of a configuration write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Document processed; `changed` tells whether a tracked field differed
    Applied { changed: bool },
    /// Document rejected; nothing happened
    Ignored(IgnoreReason),
}

impl WriteOutcome {
    /// Whether the document was processed.
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied { .. })
    }

    /// Whether a tracked field changed.
    pub fn changed(&self) -> bool {
        matches!(self, WriteOutcome::Applied { changed: true })
    }
}

/// Trait every host-pluggable module implements.
///
/// Hosts call these serially. Dropping the box, or calling [`destroy`],
/// releases the module exactly once.
///
/// [`destroy`]: PowerModule::destroy
pub trait PowerModule: Send + Sync {
    /// Localized display name.
    fn name(&self) -> &str;

    /// Stable machine key, shared with the settings editor.
    fn key(&self) -> &str;

    /// Name and key together.
    fn identity(&self) -> ModuleIdentity {
        ModuleIdentity::new(self.name(), self.key())
    }

    /// Administrative policy for this module. Never fails.
    fn policy_state(&self) -> PolicyDecision {
        PolicyDecision::Unmanaged
    }

    /// Current configuration document; `None` when the module does not serve
    /// it through this channel.
    fn read_config(&self) -> Option<String> {
        None
    }

    /// Accept a configuration document saved by the external editor.
    fn write_config(&mut self, document: &str) -> WriteOutcome;

    /// Turn the module on.
    fn enable(&mut self);

    /// Turn the module off.
    fn disable(&mut self);

    /// Whether the module is on.
    fn is_enabled(&self) -> bool;

    /// Whether the host should enable the module on first run.
    fn is_enabled_by_default(&self) -> bool {
        true
    }

    /// Host reports the "hide file extension" setting changed.
    fn on_hide_extension_hint(&self, _hide: bool) {}

    /// Host reports the template location setting changed.
    fn on_template_location_hint(&self, _path: &str) {}

    /// Release the module.
    fn destroy(self: Box<Self>) {}
}
