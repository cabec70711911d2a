//! Host Module
//!
//! What a host application uses to drive modules:
//! - Module registry with policy enforcement
//! - C ABI for shared-library loading

pub mod ffi;
pub mod registry;

pub use registry::{HostError, HostResult, ModuleHost, ModuleStatus};
