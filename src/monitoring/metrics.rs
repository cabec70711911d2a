//! Event counters.
//!
//! Counts module events per kind and fans events out to several sinks.

use crate::monitoring::events::{EventSink, ModuleEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A counter metric (monotonically increasing).
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current value.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Per-kind event counters.
#[derive(Debug, Default)]
pub struct EventCounters {
    counters: RwLock<HashMap<&'static str, Counter>>,
}

impl EventCounters {
    /// Create empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the counter for an event kind name.
    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .read()
            .ok()
            .and_then(|c| c.get(name).map(Counter::get))
            .unwrap_or(0)
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.counters
            .read()
            .map(|c| c.values().map(Counter::get).sum())
            .unwrap_or(0)
    }

    /// Export in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();
        output.push_str("# HELP newplus_events_total Module events by kind\n");
        output.push_str("# TYPE newplus_events_total counter\n");

        if let Ok(counters) = self.counters.read() {
            let mut names: Vec<_> = counters.keys().copied().collect();
            names.sort_unstable();
            for name in names {
                let value = counters.get(name).map(Counter::get).unwrap_or(0);
                output.push_str(&format!(
                    "newplus_events_total{{kind=\"{}\"}} {}\n",
                    name, value
                ));
            }
        }

        output
    }

    /// Reset every counter to zero.
    pub fn reset(&self) {
        if let Ok(counters) = self.counters.read() {
            counters.values().for_each(Counter::reset);
        }
    }
}

impl EventSink for EventCounters {
    fn emit(&self, event: &ModuleEvent) {
        let name = event.kind.name();
        if let Ok(counters) = self.counters.read() {
            if let Some(counter) = counters.get(name) {
                counter.inc();
                return;
            }
        }
        if let Ok(mut counters) = self.counters.write() {
            counters.entry(name).or_default().inc();
        }
    }
}

/// Sink delivering each event to every inner sink in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    /// Create an empty fanout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of inner sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no inner sinks.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &ModuleEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
