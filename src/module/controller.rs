//! New+ module controller.
//!
//! Mirrors the enabled flag for the host and watches configuration saves for
//! template location changes. Durable settings belong to the external editor;
//! nothing here writes them.

use crate::core::{same_ignore_case, Error, Result, SessionId};
use crate::module::config::{ModuleConfig, MODULE_KEY};
use crate::module::interface::{IgnoreReason, PowerModule, WriteOutcome};
use crate::monitoring::{EventKind, EventSink, ModuleEvent, TracingEventSink};
use crate::package::{CommandRegistrar, NoopRegistrar, OnceRegistrar, PackageRegistrar};
use crate::policy::{
    FilePolicySource, GpoPolicyProvider, MemoryPolicySource, PolicyDecision, PolicyProvider,
    PolicySource,
};
use crate::resources::{self, ResourceLoader, ResourceTable, MODULE_NAME_RESOURCE};
use crate::settings::{JsonSettingsStore, SettingsStore};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

/// Display name used when no localized string is available.
pub const DEFAULT_DISPLAY_NAME: &str = "New+";

/// Configuration document field tracked for changes.
pub const TEMPLATE_LOCATION_KEY: &str = "template_location";

/// The New+ module as seen by a host.
pub struct ModuleController {
    key: String,
    session: SessionId,
    display_name: OnceLock<String>,
    enabled: bool,
    settings: Arc<dyn SettingsStore>,
    policy: Arc<dyn PolicyProvider>,
    registrar: Arc<dyn PackageRegistrar>,
    resources: Option<Arc<dyn ResourceLoader>>,
    events: Arc<dyn EventSink>,
}

impl ModuleController {
    /// Create a controller with default collaborators for everything but
    /// settings and policy.
    pub fn new(settings: Arc<dyn SettingsStore>, policy: Arc<dyn PolicyProvider>) -> Self {
        ModuleControllerBuilder::new(settings, policy).build()
    }

    /// Start building a controller.
    pub fn builder(
        settings: Arc<dyn SettingsStore>,
        policy: Arc<dyn PolicyProvider>,
    ) -> ModuleControllerBuilder {
        ModuleControllerBuilder::new(settings, policy)
    }

    /// Wire a controller from a module configuration.
    ///
    /// A resource table that fails to load is logged and the fallback name
    /// is used.
    pub fn from_config(config: &ModuleConfig) -> Result<Self> {
        config.validate()?;

        let settings = Arc::new(JsonSettingsStore::new(
            &config.settings_root,
            &config.module_key,
            &config.default_template_location,
        ));

        let source: Arc<dyn PolicySource> = match &config.policy_file {
            Some(path) => Arc::new(FilePolicySource::new(path)),
            None => Arc::new(MemoryPolicySource::new()),
        };
        let policy = Arc::new(GpoPolicyProvider::newplus(source));

        let registrar: Arc<dyn PackageRegistrar> = match &config.registration {
            Some(command) => Arc::new(OnceRegistrar::new(CommandRegistrar::new(command.clone()))),
            None => Arc::new(NoopRegistrar),
        };

        let mut builder = ModuleControllerBuilder::new(settings, policy)
            .key(&config.module_key)
            .registrar(registrar);

        if let Some(path) = &config.resources_file {
            match ResourceTable::from_file(path) {
                Ok(table) => builder = builder.resources(Arc::new(table)),
                Err(e) => warn!(error = %e, "resource table unavailable, using fallback name"),
            }
        }

        Ok(builder.build())
    }

    /// Session of this instance.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Constant: New+ is opt-in.
    pub fn default_enabled(&self) -> bool {
        false
    }

    /// Accept a configuration document as raw bytes.
    pub fn write_config_bytes(&mut self, document: &[u8]) -> WriteOutcome {
        match self.template_location_changed(document) {
            Ok(changed) => {
                if changed {
                    self.emit(EventKind::TemplateLocationChanged);
                }
                WriteOutcome::Applied { changed }
            }
            Err(e) => {
                error!(module = %self.key, error = %e, "Configuration parsing failed");
                WriteOutcome::Ignored(ignore_reason(e))
            }
        }
    }

    fn template_location_changed(&self, document: &[u8]) -> Result<bool> {
        let document: serde_json::Value =
            serde_json::from_slice(document).map_err(|e| Error::ConfigParse(e.to_string()))?;

        let latest = document
            .get(TEMPLATE_LOCATION_KEY)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::MissingField(TEMPLATE_LOCATION_KEY.to_string()))?;
        let existing = self.settings.template_location()?;

        Ok(!same_ignore_case(latest, &existing))
    }

    fn emit(&self, kind: EventKind) {
        self.events
            .emit(&ModuleEvent::new(&self.key, self.session, kind));
    }
}

fn ignore_reason(err: Error) -> IgnoreReason {
    match err {
        Error::ConfigParse(msg) => IgnoreReason::Malformed(msg),
        Error::MissingField(field) => IgnoreReason::MissingField(field),
        other => IgnoreReason::SettingsUnavailable(other.to_string()),
    }
}

impl PowerModule for ModuleController {
    fn name(&self) -> &str {
        self.display_name.get_or_init(|| {
            resources::resolve(
                self.resources.as_deref(),
                MODULE_NAME_RESOURCE,
                DEFAULT_DISPLAY_NAME,
            )
        })
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn policy_state(&self) -> PolicyDecision {
        self.policy.query().unwrap_or_else(|e| {
            warn!(module = %self.key, error = %e, "policy lookup failed, treating as unmanaged");
            PolicyDecision::Unmanaged
        })
    }

    fn read_config(&self) -> Option<String> {
        // Settings propagate through the editor's JSON files.
        None
    }

    fn write_config(&mut self, document: &str) -> WriteOutcome {
        self.write_config_bytes(document.as_bytes())
    }

    fn enable(&mut self) {
        info!(module = %self.key, "New+ enabled via host");

        if let Err(e) = self.registrar.register() {
            error!(module = %self.key, error = %e, "package registration failed");
            self.emit(EventKind::RegistrationFailed {
                reason: e.to_string(),
            });
        }

        self.enabled = true;
        self.emit(EventKind::Enabled);
    }

    fn disable(&mut self) {
        info!(module = %self.key, "New+ disabled via host");

        self.enabled = false;
        self.emit(EventKind::Disabled);
    }

    fn is_enabled(&self) -> bool {
        self.emit(EventKind::EnabledQueried {
            enabled: self.enabled,
        });
        self.enabled
    }

    fn is_enabled_by_default(&self) -> bool {
        self.default_enabled()
    }

    fn on_hide_extension_hint(&self, hide: bool) {
        let stored = match self.settings.hide_file_extension() {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!(module = %self.key, error = %e, "could not read stored hide file extension");
                None
            }
        };
        info!(module = %self.key, hide, ?stored, "New+ hide file extension");
        self.emit(EventKind::HideExtensionHint { hide, stored });
    }

    fn on_template_location_hint(&self, path: &str) {
        info!(module = %self.key, "New+ template location");
        self.emit(EventKind::TemplateLocationHint {
            path: path.to_string(),
        });
    }

    fn destroy(self: Box<Self>) {
        debug!(module = %self.key, session = %self.session, "module destroyed");
    }
}

/// Builder for [`ModuleController`].
pub struct ModuleControllerBuilder {
    key: String,
    settings: Arc<dyn SettingsStore>,
    policy: Arc<dyn PolicyProvider>,
    registrar: Arc<dyn PackageRegistrar>,
    resources: Option<Arc<dyn ResourceLoader>>,
    events: Arc<dyn EventSink>,
}

impl ModuleControllerBuilder {
    /// Start with the required collaborators.
    pub fn new(settings: Arc<dyn SettingsStore>, policy: Arc<dyn PolicyProvider>) -> Self {
        Self {
            key: MODULE_KEY.to_string(),
            settings,
            policy,
            registrar: Arc::new(NoopRegistrar),
            resources: None,
            events: Arc::new(TracingEventSink),
        }
    }

    /// Override the machine key.
    pub fn key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// Set the package registrar.
    pub fn registrar(mut self, registrar: Arc<dyn PackageRegistrar>) -> Self {
        self.registrar = registrar;
        self
    }

    /// Set the localized resources.
    pub fn resources(mut self, resources: Arc<dyn ResourceLoader>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Set the event sink.
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Build the controller, reading the initial enabled flag from settings.
    pub fn build(self) -> ModuleController {
        let enabled = self.settings.enabled().unwrap_or_else(|e| {
            warn!(module = %self.key, error = %e, "could not read enabled flag, starting disabled");
            false
        });

        ModuleController {
            key: self.key,
            session: SessionId::new(),
            display_name: OnceLock::new(),
            enabled,
            settings: self.settings,
            policy: self.policy,
            registrar: self.registrar,
            resources: self.resources,
            events: self.events,
        }
    }
}
