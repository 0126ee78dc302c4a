//! Notification Sink for realtime admin updates
//!
//! Lifecycle events are fanned out to every connected admin. Delivery is
//! best-effort: a subscriber that falls behind skips what it missed and
//! nothing is replayed.

use std::sync::{Arc, Mutex};

use shared::BookingEvent;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Publish channel to the admin audience
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: &BookingEvent) -> Result<(), NotifyError>;
}

/// Broadcast channel shared by all admin WebSocket connections
///
/// Events are encoded once and handed to subscribers as JSON text.
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Arc<str>>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        let payload: Arc<str> = serde_json::to_string(event)?.into();
        match self.tx.send(payload) {
            Ok(delivered) => {
                tracing::debug!(event = event.name(), delivered, "Event published");
            }
            // No admin connected
            Err(_) => {
                tracing::debug!(event = event.name(), "No admin subscribers");
            }
        }
        Ok(())
    }
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _event: &BookingEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Sink that keeps every event in memory, for assertions
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BookingEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BookingEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(BookingEvent::name).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .map_err(|e| NotifyError::Unavailable(e.to_string()))?
            .push(event.clone());
        Ok(())
    }
}

/// Sink that always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSink;

impl NotificationSink for FailingSink {
    fn publish(&self, _event: &BookingEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("sink offline".to_string()))
    }
}
