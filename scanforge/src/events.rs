//! Event sink trait and implementations.
//!
//! The coordinator reports stage lifecycle transitions through an
//! [`EventSink`] so observers (logs, tests) can follow a run without
//! coupling to the execution loop.

use async_trait::async_trait;
use tracing::info;

/// Trait for sinks that receive pipeline lifecycle events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);

    /// Emits an event without blocking. Must never fail or panic.
    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// A sink that forwards events to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    /// Creates a new logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.try_emit(event_type, data);
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        info!(event_type = %event_type, event_data = ?data, "{event_type}");
    }
}

/// A sink that collects events in memory for test assertions.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns just the event types, in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|(ty, _)| ty.clone()).collect()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.try_emit(event_type, data);
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}
