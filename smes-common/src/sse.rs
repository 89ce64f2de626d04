//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE broadcaster used to push dashboard refresh notifications to
//! connected clients.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Heartbeat/keep-alive interval for all SSE streams
const KEEP_ALIVE_SECS: u64 = 15;

/// A named SSE event with a JSON payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseEvent {
    /// Event name delivered to the client (`event:` field)
    pub event: String,
    /// JSON payload (`data:` field)
    pub data: serde_json::Value,
}

impl SseEvent {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// SSE broadcaster managing client connections and event distribution
#[derive(Clone)]
pub struct SseBroadcaster {
    tx: broadcast::Sender<SseEvent>,
}

impl SseBroadcaster {
    /// Create a new broadcaster buffering up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("SSE broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Broadcast an event, ignoring if no clients are connected
    pub fn broadcast_lossy(&self, event: SseEvent) {
        if let Ok(count) = self.tx.send(event) {
            debug!("Broadcast event to {} clients", count);
        }
    }

    /// Current number of connected clients
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Build the SSE response for a newly connected client.
    ///
    /// Sends an initial `ConnectionStatus` event, then forwards broadcast
    /// events until the client disconnects. A lagged client skips the
    /// missed events and keeps receiving; the next refresh carries the
    /// full current state anyway.
    pub fn client_stream(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let mut rx = self.tx.subscribe();
        info!("New SSE client connected");

        let stream = async_stream::stream! {
            yield Ok(Event::default().event("ConnectionStatus").data("connected"));

            loop {
                match rx.recv().await {
                    Ok(sse_event) => {
                        match Event::default().event(&sse_event.event).json_data(&sse_event.data) {
                            Ok(event) => yield Ok(event),
                            Err(e) => warn!("SSE: failed to serialize event: {}", e),
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("SSE client lagged, skipped {} events", n);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(KEEP_ALIVE_SECS))
                .text("heartbeat"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_without_clients_is_silent() {
        let sse = SseBroadcaster::new(8);
        sse.broadcast_lossy(SseEvent::new("DashboardRefresh", json!({"users": 0})));
        assert_eq!(sse.client_count(), 0);
    }
}
