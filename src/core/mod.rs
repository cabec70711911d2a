//! Core utilities and common types for New+.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
