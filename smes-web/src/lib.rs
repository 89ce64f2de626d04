//! smes-web library - survey collection and analytics dashboard service
//!
//! Serves both surfaces of the research platform: the questionnaire
//! submission API and the live analytics dashboard (aggregated charts,
//! funnel, KPIs, tabular views, CSV/XLSX export).

use axum::Router;
use sqlx::SqlitePool;

use smes_common::events::EventBus;
use smes_common::sse::SseBroadcaster;

pub mod api;
pub mod export;
pub mod pagination;
pub mod report;
pub mod store;

pub use store::SnapshotHandle;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Shared secret for admin API authentication (0 disables auth)
    pub shared_secret: i64,
    /// Store change notifications (write path → store watcher)
    pub bus: EventBus,
    /// Dashboard push channel (store watcher → connected clients)
    pub sse: SseBroadcaster,
    /// Current in-memory snapshot of both collections
    pub snapshot: SnapshotHandle,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        shared_secret: i64,
        bus: EventBus,
        sse: SseBroadcaster,
        snapshot: SnapshotHandle,
    ) -> Self {
        Self {
            db,
            shared_secret,
            bus,
            sse,
            snapshot,
        }
    }
}

/// Build application router
///
/// Admin routes require authentication; everything else is public
/// (the health endpoint deliberately so, for monitoring).
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/api/admin/responses/delete", post(api::admin::delete_response))
        .route("/api/admin/users/delete", post(api::admin::delete_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/static/app.js", get(api::ui::serve_app_js))
        .route("/api/events", get(api::sse::event_stream))
        .route("/api/survey/schema", get(api::survey::get_schema))
        .route("/api/survey/status/:id", get(api::survey::get_status))
        .route("/api/survey/submit", post(api::survey::submit))
        .route("/api/identity/signin", post(api::identity::signin))
        .route("/api/dashboard/kpis", get(api::dashboard::get_kpis))
        .route("/api/dashboard/charts", get(api::dashboard::get_charts))
        .route("/api/dashboard/funnel", get(api::dashboard::get_funnel))
        .route("/api/dashboard/users", get(api::dashboard::get_users))
        .route("/api/dashboard/table", get(api::dashboard::get_table))
        .route("/api/export", get(api::export::run_export))
        .merge(api::health::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
