//! Policy Module
//!
//! Administrative overrides of module enablement:
//! - PolicyProvider trait and decisions
//! - Group-policy style provider with machine/user sources

pub mod gpo;
pub mod provider;

pub use gpo::{FilePolicySource, GpoPolicyProvider, MemoryPolicySource, PolicyScope, PolicySource};
pub use provider::{PolicyDecision, PolicyProvider, StaticPolicy};
