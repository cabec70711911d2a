//! Module observability events.
//!
//! Every lifecycle step of a module is reported as a [`ModuleEvent`] to an
//! injected [`EventSink`]. Hosts forward these to their telemetry channel;
//! tests capture them with [`RecordingEventSink`].

use crate::core::{now, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::RwLock;

/// Kind of event emitted by a module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Module was enabled by the host
    Enabled,
    /// Module was disabled by the host
    Disabled,
    /// Host queried the enabled flag
    EnabledQueried { enabled: bool },
    /// The template location in an incoming configuration differs from the stored one
    TemplateLocationChanged,
    /// Host reported the "hide file extension" setting; `stored` is the
    /// persisted value, if readable
    HideExtensionHint { hide: bool, stored: Option<bool> },
    /// Host reported a new template location
    TemplateLocationHint { path: String },
    /// Feature package registration failed during enable
    RegistrationFailed { reason: String },
}

impl EventKind {
    /// Stable name used for counters and log lines.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Enabled => "enabled",
            EventKind::Disabled => "disabled",
            EventKind::EnabledQueried { .. } => "enabled_queried",
            EventKind::TemplateLocationChanged => "template_location_changed",
            EventKind::HideExtensionHint { .. } => "hide_extension_hint",
            EventKind::TemplateLocationHint { .. } => "template_location_hint",
            EventKind::RegistrationFailed { .. } => "registration_failed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single emitted event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleEvent {
    /// Emission time
    pub timestamp: Timestamp,
    /// Machine key of the emitting module
    pub module: String,
    /// Session of the emitting module instance
    pub session: SessionId,
    /// What happened
    pub kind: EventKind,
}

impl ModuleEvent {
    /// Create a new event stamped with the current time.
    pub fn new(module: &str, session: SessionId, kind: EventKind) -> Self {
        Self {
            timestamp: now(),
            module: module.to_string(),
            session,
            kind,
        }
    }

    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Receiver of module events.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: &ModuleEvent);
}

/// Sink that renders events through `tracing`.
#[derive(Clone, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &ModuleEvent) {
        match &event.kind {
            EventKind::RegistrationFailed { reason } => tracing::warn!(
                module = %event.module,
                session = %event.session,
                event = event.kind.name(),
                %reason,
                "module event"
            ),
            kind => tracing::info!(
                module = %event.module,
                session = %event.session,
                event = kind.name(),
                "module event"
            ),
        }
    }
}

/// Sink that keeps emitted events in memory.
pub struct RecordingEventSink {
    buffer: RwLock<VecDeque<ModuleEvent>>,
    max_buffer: usize,
}

impl RecordingEventSink {
    /// Create a recorder holding at most 1000 events.
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create a recorder holding at most `max_buffer` events.
    pub fn with_capacity(max_buffer: usize) -> Self {
        Self {
            buffer: RwLock::new(VecDeque::new()),
            max_buffer: max_buffer.max(1),
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<ModuleEvent> {
        self.buffer
            .read()
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of recorded events with the given kind name.
    pub fn count(&self, name: &str) -> usize {
        self.buffer
            .read()
            .map(|b| b.iter().filter(|e| e.kind.name() == name).count())
            .unwrap_or(0)
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.buffer.read().map(|b| b.len()).unwrap_or(0)
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.write() {
            buffer.clear();
        }
    }
}

impl Default for RecordingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &ModuleEvent) {
        if let Ok(mut buffer) = self.buffer.write() {
            if buffer.len() >= self.max_buffer {
                buffer.pop_front();
            }
            buffer.push_back(event.clone());
        }
    }
}
