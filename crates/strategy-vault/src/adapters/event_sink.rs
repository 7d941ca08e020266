//! Event sink adapters.
//!
//! The vault hands every committed event to a `VaultEventSink`.

use crate::domain::VaultEvent;
use crate::ports::outbound::{PublishError, VaultEventSink};
use parking_lot::Mutex;
use tracing::info;

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEventSink;

impl VaultEventSink for NoOpEventSink {
    fn publish(&self, _event: &VaultEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Sink that keeps events in memory for inspection.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<VaultEvent>>,
}

impl RecordingEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<VaultEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<VaultEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Names of the recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(VaultEvent::name).collect()
    }
}

impl VaultEventSink for RecordingEventSink {
    fn publish(&self, event: &VaultEvent) -> Result<(), PublishError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Sink that logs each event as JSON at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl VaultEventSink for TracingEventSink {
    fn publish(&self, event: &VaultEvent) -> Result<(), PublishError> {
        let payload =
            serde_json::to_string(event).map_err(|e| PublishError::Serialization(e.to_string()))?;
        info!(event = event.name(), %payload, "vault event");
        Ok(())
    }
}
