//! In-memory snapshot of the two collections and the watcher that keeps
//! it current.
//!
//! The dashboard never queries the database directly: it reads a snapshot
//! that the watcher replaces wholesale whenever a change notification
//! arrives. Rapid notifications (a submission touches both collections)
//! collapse into a single reload through a short debounce window. The
//! refresh is idempotent; reloading with no underlying change is harmless.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use smes_common::db::{self, ResponseRecord, UserRecord};
use smes_common::events::EventBus;
use smes_common::sse::{SseBroadcaster, SseEvent};
use smes_common::Result;

/// Debounce window for collapsing back-to-back change notifications
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(200);

/// A consistent view of both collections at one point in time
#[derive(Debug, Default)]
pub struct Snapshot {
    pub users: Vec<UserRecord>,
    pub responses: Vec<ResponseRecord>,
}

/// Shared handle to the current snapshot.
///
/// Readers get an `Arc` to an immutable snapshot; the watcher swaps the
/// whole snapshot on refresh ("last snapshot wins"). No partial mutation
/// ever happens.
#[derive(Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotHandle {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// The current snapshot; cheap to call from any handler
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.read().unwrap().clone()
    }

    fn replace(&self, next: Snapshot) {
        *self.inner.write().unwrap() = Arc::new(next);
    }
}

/// Load a fresh snapshot of both collections
pub async fn load_snapshot(db: &SqlitePool) -> Result<Snapshot> {
    let users = db::users::list(db).await?;
    let responses = db::responses::list(db).await?;
    Ok(Snapshot { users, responses })
}

/// Background task reacting to store change notifications
pub struct StoreWatcher;

impl StoreWatcher {
    /// Subscribe to the bus and keep the snapshot current.
    ///
    /// On a bus error the watcher logs and stops; the dashboard then
    /// serves the last good snapshot. Submissions are unaffected (they go
    /// through the direct write path).
    pub fn spawn(
        db: SqlitePool,
        bus: EventBus,
        sse: SseBroadcaster,
        snapshot: SnapshotHandle,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut rx = bus.subscribe();
            info!("Store watcher started");

            loop {
                match rx.recv().await {
                    Ok(event) => {
                        debug!("Store change notification: {:?}", event);

                        // Collapse any further notifications arriving
                        // within the debounce window into this reload.
                        tokio::time::sleep(REFRESH_DEBOUNCE).await;
                        loop {
                            match rx.try_recv() {
                                Ok(_) => continue,
                                Err(TryRecvError::Lagged(n)) => {
                                    warn!("Store watcher lagged, skipped {} events", n);
                                    continue;
                                }
                                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                            }
                        }

                        match load_snapshot(&db).await {
                            Ok(next) => {
                                let users = next.users.len();
                                let responses = next.responses.len();
                                snapshot.replace(next);
                                debug!(
                                    "Snapshot refreshed: {} users, {} responses",
                                    users, responses
                                );
                                sse.broadcast_lossy(SseEvent::new(
                                    "DashboardRefresh",
                                    json!({ "users": users, "responses": responses }),
                                ));
                            }
                            Err(e) => {
                                // Keep the last good snapshot
                                error!("Snapshot reload failed: {}", e);
                            }
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("Store watcher lagged, skipped {} events", n);
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        error!("Store subscription closed; dashboard updates stopped");
                        break;
                    }
                }
            }
        })
    }
}
