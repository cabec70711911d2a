//! Group-policy style provider.
//!
//! Policies are DWORD values keyed by name, looked up machine scope first and
//! user scope second. A utility-specific value wins over the global one.

use crate::core::{Error, Result};
use crate::policy::provider::{PolicyDecision, PolicyProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Global value applying to every utility.
pub const GLOBAL_ENABLED_VALUE: &str = "ConfigureGlobalUtilityEnabledState";
/// Utility-specific value for New+.
pub const NEWPLUS_ENABLED_VALUE: &str = "ConfigureEnabledUtilityNewPlus";

/// Scope a policy value was defined in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyScope {
    /// Machine-wide policy
    Machine,
    /// Per-user policy
    User,
}

/// Raw policy value storage.
pub trait PolicySource: Send + Sync {
    /// Snapshot of every configured value. One query resolves against a
    /// single snapshot.
    fn load_all(&self) -> Result<MemoryPolicySource>;
}

/// Policy values kept in memory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryPolicySource {
    /// Machine-scope values
    #[serde(default)]
    pub machine: HashMap<String, u32>,
    /// User-scope values
    #[serde(default)]
    pub user: HashMap<String, u32>,
}

impl MemoryPolicySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn with_value(mut self, scope: PolicyScope, name: &str, value: u32) -> Self {
        match scope {
            PolicyScope::Machine => self.machine.insert(name.to_string(), value),
            PolicyScope::User => self.user.insert(name.to_string(), value),
        };
        self
    }

    /// Read a DWORD value; `None` when not configured.
    pub fn value(&self, scope: PolicyScope, name: &str) -> Option<u32> {
        let values = match scope {
            PolicyScope::Machine => &self.machine,
            PolicyScope::User => &self.user,
        };
        values.get(name).copied()
    }
}

impl PolicySource for MemoryPolicySource {
    fn load_all(&self) -> Result<MemoryPolicySource> {
        Ok(self.clone())
    }
}

/// Policy values read from a JSON file with `machine` and `user` maps.
///
/// A missing file means no policy is configured.
#[derive(Clone, Debug)]
pub struct FilePolicySource {
    path: PathBuf,
}

impl FilePolicySource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PolicySource for FilePolicySource {
    fn load_all(&self) -> Result<MemoryPolicySource> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MemoryPolicySource::default());
            }
            Err(e) => {
                return Err(Error::PolicyLookup(format!("{}: {}", self.path.display(), e)));
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| Error::PolicyLookup(format!("{}: {}", self.path.display(), e)))
    }
}

/// Provider resolving a utility value with global fallback.
pub struct GpoPolicyProvider {
    source: Arc<dyn PolicySource>,
    utility_value: String,
}

impl GpoPolicyProvider {
    /// Create a provider for the given utility value name.
    pub fn new(source: Arc<dyn PolicySource>, utility_value: &str) -> Self {
        Self {
            source,
            utility_value: utility_value.to_string(),
        }
    }

    /// Provider for the New+ utility.
    pub fn newplus(source: Arc<dyn PolicySource>) -> Self {
        Self::new(source, NEWPLUS_ENABLED_VALUE)
    }
}

fn read_configured(values: &MemoryPolicySource, name: &str) -> PolicyDecision {
    [PolicyScope::Machine, PolicyScope::User]
        .into_iter()
        .find_map(|scope| values.value(scope, name))
        .map_or(PolicyDecision::Unmanaged, |raw| decode(name, raw))
}

fn decode(name: &str, raw: u32) -> PolicyDecision {
    match raw {
        1 => PolicyDecision::ForceEnabled,
        0 => PolicyDecision::ForceDisabled,
        other => {
            tracing::warn!(policy = name, value = other, "unexpected policy value, ignoring");
            PolicyDecision::Unmanaged
        }
    }
}

impl PolicyProvider for GpoPolicyProvider {
    fn query(&self) -> Result<PolicyDecision> {
        let values = self.source.load_all()?;
        Ok(match read_configured(&values, &self.utility_value) {
            PolicyDecision::Unmanaged => read_configured(&values, GLOBAL_ENABLED_VALUE),
            decision => decision,
        })
    }
}
