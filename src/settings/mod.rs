//! Settings Module
//!
//! Read-only access to durable module settings:
//! - SettingsStore trait
//! - In-memory store
//! - Editor JSON file store

pub mod json;
pub mod store;

pub use json::{JsonSettingsStore, ModuleSettings};
pub use store::{MemorySettingsStore, SettingsStore};
