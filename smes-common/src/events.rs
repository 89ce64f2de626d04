//! Event types for the SMES store
//!
//! Provides the shared change-notification event and the EventBus used to
//! drive dashboard refreshes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Store change notifications
///
/// Every committed mutation of a collection emits one event. Subscribers
/// (the dashboard's store watcher) treat any event as "reload the whole
/// snapshot"; the variants exist so the two collections can be observed
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// A user record was created, updated, or deleted
    UsersChanged {
        user_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A response document was created, updated, or deleted
    ResponsesChanged {
        user_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl StoreEvent {
    pub fn users_changed(user_id: impl Into<String>) -> Self {
        StoreEvent::UsersChanged {
            user_id: user_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn responses_changed(user_id: impl Into<String>) -> Self {
        StoreEvent::ResponsesChanged {
            user_id: user_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Central event distribution bus for store change notifications
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(&self, event: StoreEvent) -> Result<usize, broadcast::error::SendError<StoreEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    ///
    /// Used on write paths: a mutation must commit whether or not a
    /// dashboard is currently watching.
    pub fn emit_lossy(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(StoreEvent::users_changed("u-1")).unwrap();

        match rx.recv().await.unwrap() {
            StoreEvent::UsersChanged { user_id, .. } => assert_eq!(user_id, "u-1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_lossy_without_subscribers() {
        let bus = EventBus::new(16);
        // No subscriber; must not panic or error
        bus.emit_lossy(StoreEvent::responses_changed("u-2"));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
