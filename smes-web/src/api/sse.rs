//! Server-Sent Events endpoint
//!
//! Streams `ConnectionStatus` on connect, then a `DashboardRefresh` event
//! every time the store watcher swaps the snapshot. Clients re-fetch the
//! dashboard data on each refresh event.

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /api/events - SSE event stream for dashboard refresh notifications
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.sse.client_stream()
}
