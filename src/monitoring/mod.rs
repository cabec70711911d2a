//! Monitoring Module
//!
//! Provides observability for New+ modules:
//! - Module events and sinks
//! - Event counters
//! - Structured logging

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EventKind, EventSink, ModuleEvent, RecordingEventSink, TracingEventSink};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
pub use metrics::{Counter, EventCounters, FanoutSink};
