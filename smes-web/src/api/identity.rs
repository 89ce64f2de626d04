//! Thin wrapper over the external identity capability
//!
//! The platform only needs a stable identifier, an email, and a display
//! name per participant. Sign-in creates the user record on first
//! authentication and is a lookup afterwards.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use smes_common::db;
use smes_common::events::StoreEvent;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub submitted: bool,
}

/// POST /api/identity/signin
///
/// Find-or-create the user record for this identity.
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, IdentityError> {
    let email = request.email.trim();
    let name = request.name.trim();

    if email.is_empty() || !email.contains('@') {
        return Err(IdentityError::InvalidInput("A valid email is required".into()));
    }
    if name.is_empty() {
        return Err(IdentityError::InvalidInput("A display name is required".into()));
    }

    if let Some(existing) = db::users::find_by_email(&state.db, email)
        .await
        .map_err(|e| IdentityError::Database(e.to_string()))?
    {
        return Ok(Json(SigninResponse {
            id: existing.id,
            name: existing.name,
            email: existing.email,
            submitted: existing.submitted,
        }));
    }

    let created = db::users::create(&state.db, name, email)
        .await
        .map_err(|e| IdentityError::Database(e.to_string()))?;
    info!("Registered participant {}", created.id);
    state.bus.emit_lossy(StoreEvent::users_changed(&created.id));

    Ok(Json(SigninResponse {
        id: created.id,
        name: created.name,
        email: created.email,
        submitted: false,
    }))
}

/// Identity API errors
#[derive(Debug)]
pub enum IdentityError {
    InvalidInput(String),
    Database(String),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            IdentityError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            IdentityError::Database(msg) => (
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
