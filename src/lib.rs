//! # New+ - module lifecycle adapter
//!
//! Lets a host application manage the New+ template feature at runtime:
//! - **Module**: identity, enablement cache and configuration change detection
//! - **Settings**: read-only access to settings owned by an external editor
//! - **Policy**: administrative overrides of enablement
//! - **Host**: module registry and C ABI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use newplus::module::{ModuleConfig, ModuleController, PowerModule};
//!
//! let config = ModuleConfig::with_settings_root("/var/lib/host/settings");
//! let mut module = ModuleController::from_config(&config).unwrap();
//!
//! module.enable();
//! assert!(module.is_enabled());
//! module.write_config(r#"{"template_location": "D:\\Templates"}"#);
//! ```

pub mod core;
pub mod host;
pub mod module;
pub mod monitoring;
pub mod package;
pub mod policy;
pub mod resources;
pub mod settings;

pub use core::error::{Error, Result};
