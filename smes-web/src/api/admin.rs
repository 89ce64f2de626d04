//! Administrative endpoints (authenticated)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use smes_common::db;
use smes_common::events::StoreEvent;

use crate::AppState;

/// Request body for admin deletions.
///
/// The auth middleware consumes the `timestamp`/`hash` fields; they are
/// simply ignored here.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub user_id: String,
}

/// POST /api/admin/responses/delete
///
/// Delete a response document and clear the owning user's submitted flag,
/// returning the participant to the "in progress" state.
pub async fn delete_response(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, AdminError> {
    db::responses::delete(&state.db, &request.user_id)
        .await
        .map_err(|e| AdminError::Database(e.to_string()))?;
    db::users::clear_submitted(&state.db, &request.user_id)
        .await
        .map_err(|e| AdminError::Database(e.to_string()))?;

    info!("Admin deleted response for {}", request.user_id);
    state
        .bus
        .emit_lossy(StoreEvent::responses_changed(&request.user_id));
    state.bus.emit_lossy(StoreEvent::users_changed(&request.user_id));

    Ok(Json(json!({ "status": "ok" })))
}

/// POST /api/admin/users/delete
///
/// Remove a participant entirely: user record and response document.
pub async fn delete_user(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, AdminError> {
    db::responses::delete(&state.db, &request.user_id)
        .await
        .map_err(|e| AdminError::Database(e.to_string()))?;
    db::users::delete(&state.db, &request.user_id)
        .await
        .map_err(|e| AdminError::Database(e.to_string()))?;

    info!("Admin deleted user {}", request.user_id);
    state
        .bus
        .emit_lossy(StoreEvent::responses_changed(&request.user_id));
    state.bus.emit_lossy(StoreEvent::users_changed(&request.user_id));

    Ok(Json(json!({ "status": "ok" })))
}

/// Admin API errors
#[derive(Debug)]
pub enum AdminError {
    Database(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
