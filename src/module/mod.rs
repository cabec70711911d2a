//! Module Lifecycle
//!
//! The New+ module as a host sees it:
//! - Module interface
//! - Controller with enablement cache and config change detection
//! - Configuration

pub mod config;
pub mod controller;
pub mod interface;

pub use config::{ModuleConfig, MODULE_KEY};
pub use controller::{ModuleController, ModuleControllerBuilder};
pub use interface::{IgnoreReason, ModuleIdentity, PowerModule, WriteOutcome};
