//! Error types for New+.

use thiserror::Error;

/// Result type alias for New+ operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in New+ operations.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration document errors
    #[error("Configuration parsing failed: {0}")]
    ConfigParse(String),

    #[error("Missing field in configuration: {0}")]
    MissingField(String),

    #[error("Invalid module configuration: {0}")]
    InvalidConfig(String),

    // Settings store errors
    #[error("Settings read failed: {0}")]
    SettingsRead(String),

    #[error("Settings file malformed: {0}")]
    SettingsParse(String),

    // Collaborator errors
    #[error("Package registration failed: {0}")]
    Registration(String),

    #[error("Policy lookup failed: {0}")]
    PolicyLookup(String),

    #[error("Resource lookup failed: {0}")]
    Resource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
