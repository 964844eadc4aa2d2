//! Progress event types and the broadcast bus that carries them
//!
//! Events mirror the state changes of analysis sessions so that push
//! subscribers (SSE) see the same state machine as polling clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why a session left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Grace period after completion elapsed
    Expired,
    /// Removed by the periodic safety-net sweep
    Swept,
    /// Removed explicitly (or replaced by a new session with the same id)
    Explicit,
}

/// Session lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    SessionCreated {
        session_id: String,
        total_steps: u32,
        timestamp: DateTime<Utc>,
    },

    ProgressUpdated {
        session_id: String,
        step: u32,
        total_steps: u32,
        current_task: String,
        details: String,
        timestamp: DateTime<Utc>,
    },

    SessionCompleted {
        session_id: String,
        timestamp: DateTime<Utc>,
    },

    SessionFailed {
        session_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    SessionRemoved {
        session_id: String,
        reason: RemovalReason,
        timestamp: DateTime<Utc>,
    },
}

impl ProgressEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::SessionCreated { .. } => "SessionCreated",
            ProgressEvent::ProgressUpdated { .. } => "ProgressUpdated",
            ProgressEvent::SessionCompleted { .. } => "SessionCompleted",
            ProgressEvent::SessionFailed { .. } => "SessionFailed",
            ProgressEvent::SessionRemoved { .. } => "SessionRemoved",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            ProgressEvent::SessionCreated { session_id, .. }
            | ProgressEvent::ProgressUpdated { session_id, .. }
            | ProgressEvent::SessionCompleted { session_id, .. }
            | ProgressEvent::SessionFailed { session_id, .. }
            | ProgressEvent::SessionRemoved { session_id, .. } => session_id,
        }
    }
}

/// Broadcast bus for progress events
///
/// Uses tokio::broadcast internally: publishing never blocks, slow
/// subscribers observe `Lagged` instead of stalling producers.
///
/// # Examples
///
/// ```
/// use leasescout_common::events::{EventBus, ProgressEvent};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(ProgressEvent::SessionCompleted {
///     session_id: "abc".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert_eq!(rx.try_recv().unwrap().session_id(), "abc");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ProgressEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ProgressEvent,
    ) -> Result<usize, broadcast::error::SendError<ProgressEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_error() {
        let bus = EventBus::new(10);
        let result = bus.emit(ProgressEvent::SessionCompleted {
            session_id: "s1".to_string(),
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit_lossy(ProgressEvent::ProgressUpdated {
            session_id: "s1".to_string(),
            step: 2,
            total_steps: 3,
            current_task: "Growth trends analysis".to_string(),
            details: String::new(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "ProgressUpdated");
        assert_eq!(event.session_id(), "s1");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ProgressEvent::SessionRemoved {
            session_id: "s1".to_string(),
            reason: RemovalReason::Swept,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionRemoved");
        assert_eq!(json["reason"], "swept");
    }
}
