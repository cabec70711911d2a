//! PolicyProvider trait definition.

use crate::core::Result;
use serde::{Deserialize, Serialize};

/// Administrative decision about a module's enablement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    /// Policy forces the module on
    ForceEnabled,
    /// Policy forces the module off
    ForceDisabled,
    /// No policy configured; user choice applies
    Unmanaged,
}

impl PolicyDecision {
    /// Whether the decision overrides user choice.
    pub fn is_forced(&self) -> bool {
        !matches!(self, PolicyDecision::Unmanaged)
    }

    /// Numeric form used on the C ABI: 1 enabled, 0 disabled, -1 unmanaged.
    pub fn as_raw(&self) -> i32 {
        match self {
            PolicyDecision::ForceEnabled => 1,
            PolicyDecision::ForceDisabled => 0,
            PolicyDecision::Unmanaged => -1,
        }
    }
}

impl Default for PolicyDecision {
    fn default() -> Self {
        PolicyDecision::Unmanaged
    }
}

impl std::fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyDecision::ForceEnabled => write!(f, "force_enabled"),
            PolicyDecision::ForceDisabled => write!(f, "force_disabled"),
            PolicyDecision::Unmanaged => write!(f, "unmanaged"),
        }
    }
}

/// Source of administrative policy for one module.
pub trait PolicyProvider: Send + Sync {
    /// Current decision.
    fn query(&self) -> Result<PolicyDecision>;
}

/// Provider returning a fixed decision.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPolicy(pub PolicyDecision);

impl StaticPolicy {
    /// No policy configured.
    pub fn unmanaged() -> Self {
        Self(PolicyDecision::Unmanaged)
    }
}

impl PolicyProvider for StaticPolicy {
    fn query(&self) -> Result<PolicyDecision> {
        Ok(self.0)
    }
}
