//! Module host registry.
//!
//! Loads modules, applies administrative policy, and routes host requests to
//! them by key.

use crate::core::{now, Timestamp};
use crate::module::interface::{PowerModule, WriteOutcome};
use crate::policy::PolicyDecision;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// Errors returned by the host registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Module {0} is already loaded")]
    AlreadyLoaded(String),

    #[error("Module {0} not found")]
    NotFound(String),

    #[error("Module {key} is locked by policy ({decision})")]
    PolicyLocked { key: String, decision: PolicyDecision },
}

/// Result type for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Status of a loaded module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleStatus {
    /// Machine key
    pub key: String,
    /// Display name
    pub name: String,
    /// Whether the module is on
    pub enabled: bool,
    /// Policy at last check
    pub policy: PolicyDecision,
    /// Load time
    pub loaded_at: Timestamp,
}

struct LoadedModule {
    module: Box<dyn PowerModule>,
    loaded_at: Timestamp,
}

/// Registry of loaded modules.
#[derive(Default)]
pub struct ModuleHost {
    modules: HashMap<String, LoadedModule>,
}

impl ModuleHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module and bring it in line with policy.
    ///
    /// Forced policies win; otherwise the module's own enabled flag decides.
    pub fn load(&mut self, mut module: Box<dyn PowerModule>) -> HostResult<PolicyDecision> {
        let key = module.key().to_string();
        if self.modules.contains_key(&key) {
            return Err(HostError::AlreadyLoaded(key));
        }

        let decision = module.policy_state();
        match decision {
            PolicyDecision::ForceEnabled => module.enable(),
            PolicyDecision::ForceDisabled => module.disable(),
            PolicyDecision::Unmanaged => {
                if module.is_enabled() {
                    module.enable();
                }
            }
        }
        info!(module = %key, policy = %decision, "module loaded");

        self.modules.insert(
            key,
            LoadedModule {
                module,
                loaded_at: now(),
            },
        );
        Ok(decision)
    }

    /// Unload a module, destroying it.
    pub fn unload(&mut self, key: &str) -> HostResult<()> {
        let entry = self
            .modules
            .remove(key)
            .ok_or_else(|| HostError::NotFound(key.to_string()))?;
        entry.module.destroy();
        info!(module = %key, "module unloaded");
        Ok(())
    }

    /// Unload every module.
    pub fn unload_all(&mut self) {
        for (key, entry) in self.modules.drain() {
            entry.module.destroy();
            info!(module = %key, "module unloaded");
        }
    }

    /// Enable a module on user request, unless policy forces it off.
    pub fn enable(&mut self, key: &str) -> HostResult<()> {
        let module = self.module_mut(key)?;
        match module.policy_state() {
            PolicyDecision::ForceDisabled => Err(policy_locked(key, PolicyDecision::ForceDisabled)),
            _ => {
                module.enable();
                Ok(())
            }
        }
    }

    /// Disable a module on user request, unless policy forces it on.
    pub fn disable(&mut self, key: &str) -> HostResult<()> {
        let module = self.module_mut(key)?;
        match module.policy_state() {
            PolicyDecision::ForceEnabled => Err(policy_locked(key, PolicyDecision::ForceEnabled)),
            _ => {
                module.disable();
                Ok(())
            }
        }
    }

    /// Forward a saved configuration document.
    pub fn set_config(&mut self, key: &str, document: &str) -> HostResult<WriteOutcome> {
        let module = self.module_mut(key)?;
        let outcome = module.write_config(document);
        if let WriteOutcome::Ignored(reason) = &outcome {
            warn!(module = %key, %reason, "configuration ignored");
        }
        Ok(outcome)
    }

    /// Forward the "hide file extension" hint.
    pub fn hide_file_extension(&self, key: &str, hide: bool) -> HostResult<()> {
        self.module(key)?.on_hide_extension_hint(hide);
        Ok(())
    }

    /// Forward the template location hint.
    pub fn template_location(&self, key: &str, path: &str) -> HostResult<()> {
        self.module(key)?.on_template_location_hint(path);
        Ok(())
    }

    /// Get a loaded module.
    pub fn module(&self, key: &str) -> HostResult<&dyn PowerModule> {
        self.modules
            .get(key)
            .map(|e| &*e.module)
            .ok_or_else(|| HostError::NotFound(key.to_string()))
    }

    fn module_mut(&mut self, key: &str) -> HostResult<&mut Box<dyn PowerModule>> {
        self.modules
            .get_mut(key)
            .map(|e| &mut e.module)
            .ok_or_else(|| HostError::NotFound(key.to_string()))
    }

    /// Status of one module.
    pub fn status(&self, key: &str) -> HostResult<ModuleStatus> {
        self.modules
            .get(key)
            .map(status_of)
            .ok_or_else(|| HostError::NotFound(key.to_string()))
    }

    /// Status of every module, sorted by key.
    pub fn list(&self) -> Vec<ModuleStatus> {
        let mut all: Vec<_> = self.modules.values().map(status_of).collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    /// Keys of enabled modules.
    pub fn enabled_modules(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .modules
            .iter()
            .filter(|(_, e)| e.module.is_enabled())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of loaded modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

fn policy_locked(key: &str, decision: PolicyDecision) -> HostError {
    warn!(module = %key, policy = %decision, "request refused by policy");
    HostError::PolicyLocked {
        key: key.to_string(),
        decision,
    }
}

fn status_of(entry: &LoadedModule) -> ModuleStatus {
    ModuleStatus {
        key: entry.module.key().to_string(),
        name: entry.module.name().to_string(),
        enabled: entry.module.is_enabled(),
        policy: entry.module.policy_state(),
        loaded_at: entry.loaded_at,
    }
}

impl Drop for ModuleHost {
    fn drop(&mut self) {
        self.unload_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleController;
    use crate::monitoring::RecordingEventSink;
    use crate::policy::StaticPolicy;
    use crate::settings::MemorySettingsStore;
    use std::sync::Arc;

    fn newplus(enabled: bool, decision: PolicyDecision) -> Box<dyn PowerModule> {
        Box::new(ModuleController::new(
            Arc::new(MemorySettingsStore::new(enabled, "C:\\Templates")),
            Arc::new(StaticPolicy(decision)),
        ))
    }

    #[test]
    fn test_host_creation() {
        let host = ModuleHost::new();
        assert_eq!(host.module_count(), 0);
    }

    #[test]
    fn test_load_module() {
        let mut host = ModuleHost::new();
        let decision = host.load(newplus(true, PolicyDecision::Unmanaged)).unwrap();

        assert_eq!(decision, PolicyDecision::Unmanaged);
        assert_eq!(host.module_count(), 1);
        assert!(host.module("NewPlus").is_ok());
        assert_eq!(host.enabled_modules(), vec!["NewPlus".to_string()]);
    }

    #[test]
    fn test_duplicate_load() {
        let mut host = ModuleHost::new();
        host.load(newplus(false, PolicyDecision::Unmanaged)).unwrap();

        let result = host.load(newplus(false, PolicyDecision::Unmanaged));
        assert_eq!(result, Err(HostError::AlreadyLoaded("NewPlus".to_string())));
    }

    #[test]
    fn test_policy_applied_on_load() {
        let mut host = ModuleHost::new();
        host.load(newplus(false, PolicyDecision::ForceEnabled)).unwrap();
        assert!(host.status("NewPlus").unwrap().enabled);

        let mut host = ModuleHost::new();
        host.load(newplus(true, PolicyDecision::ForceDisabled)).unwrap();
        assert!(!host.status("NewPlus").unwrap().enabled);
    }

    #[test]
    fn test_policy_locks_user_requests() {
        let mut host = ModuleHost::new();
        host.load(newplus(false, PolicyDecision::ForceDisabled)).unwrap();

        let result = host.enable("NewPlus");
        assert_eq!(
            result,
            Err(HostError::PolicyLocked {
                key: "NewPlus".to_string(),
                decision: PolicyDecision::ForceDisabled,
            })
        );
        assert!(host.disable("NewPlus").is_ok());

        let mut host = ModuleHost::new();
        host.load(newplus(true, PolicyDecision::ForceEnabled)).unwrap();
        assert!(host.disable("NewPlus").is_err());
        assert!(host.status("NewPlus").unwrap().enabled);
    }

    #[test]
    fn test_unmanaged_toggle() {
        let mut host = ModuleHost::new();
        host.load(newplus(false, PolicyDecision::Unmanaged)).unwrap();

        host.enable("NewPlus").unwrap();
        assert!(host.status("NewPlus").unwrap().enabled);

        host.disable("NewPlus").unwrap();
        assert!(host.enabled_modules().is_empty());
    }

    #[test]
    fn test_set_config() {
        let mut host = ModuleHost::new();
        host.load(newplus(false, PolicyDecision::Unmanaged)).unwrap();

        let outcome = host
            .set_config("NewPlus", r#"{"template_location": "D:\\Other"}"#)
            .unwrap();
        assert!(outcome.changed());

        let outcome = host.set_config("NewPlus", "not json").unwrap();
        assert!(!outcome.is_applied());

        assert!(host.set_config("Missing", "{}").is_err());
    }

    #[test]
    fn test_hints_forwarded() {
        let events = Arc::new(RecordingEventSink::new());
        let module = ModuleController::builder(
            Arc::new(MemorySettingsStore::default()),
            Arc::new(StaticPolicy::unmanaged()),
        )
        .events(events.clone())
        .build();

        let mut host = ModuleHost::new();
        host.load(Box::new(module)).unwrap();
        host.hide_file_extension("NewPlus", false).unwrap();
        host.template_location("NewPlus", "D:\\Templates").unwrap();

        assert_eq!(events.count("hide_extension_hint"), 1);
        assert_eq!(events.count("template_location_hint"), 1);
    }

    #[test]
    fn test_unload_module() {
        let mut host = ModuleHost::new();
        host.load(newplus(false, PolicyDecision::Unmanaged)).unwrap();
        host.unload("NewPlus").unwrap();

        assert_eq!(host.module_count(), 0);
        assert_eq!(host.unload("NewPlus"), Err(HostError::NotFound("NewPlus".to_string())));
    }

    #[test]
    fn test_list_modules() {
        let mut host = ModuleHost::new();
        host.load(newplus(true, PolicyDecision::Unmanaged)).unwrap();

        let modules = host.list();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].key, "NewPlus");
        assert_eq!(modules[0].name, "New+");
        assert_eq!(modules[0].policy, PolicyDecision::Unmanaged);
    }
}
