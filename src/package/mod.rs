//! Feature package registration.
//!
//! Enabling the module activates its shell packaging. Registration must be
//! idempotent; failures are reported to the caller, which decides whether
//! they matter.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

/// Activates the feature's packaging.
pub trait PackageRegistrar: Send + Sync {
    /// Register the package; calling again after success is a no-op.
    fn register(&self) -> Result<()>;
}

/// Registrar that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRegistrar;

impl PackageRegistrar for NoopRegistrar {
    fn register(&self) -> Result<()> {
        Ok(())
    }
}

/// External command performing the registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCommand {
    /// Program to run
    pub program: String,
    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// Registrar running an external command; non-zero exit is a failure.
#[derive(Clone, Debug)]
pub struct CommandRegistrar {
    command: RegistrationCommand,
}

impl CommandRegistrar {
    /// Create a registrar for `command`.
    pub fn new(command: RegistrationCommand) -> Self {
        Self { command }
    }
}

impl PackageRegistrar for CommandRegistrar {
    fn register(&self) -> Result<()> {
        tracing::debug!(program = %self.command.program, "running package registration");

        let status = Command::new(&self.command.program)
            .args(&self.command.args)
            .status()
            .map_err(|e| Error::Registration(format!("{}: {}", self.command.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Registration(format!(
                "{} exited with {}",
                self.command.program, status
            )))
        }
    }
}

/// Wraps a registrar so it only runs until the first success.
pub struct OnceRegistrar<R> {
    inner: R,
    registered: AtomicBool,
}

impl<R: PackageRegistrar> OnceRegistrar<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            registered: AtomicBool::new(false),
        }
    }

    /// Whether a registration already succeeded.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }
}

impl<R: PackageRegistrar> PackageRegistrar for OnceRegistrar<R> {
    fn register(&self) -> Result<()> {
        if self.is_registered() {
            return Ok(());
        }
        self.inner.register()?;
        self.registered.store(true, Ordering::Release);
        Ok(())
    }
}
