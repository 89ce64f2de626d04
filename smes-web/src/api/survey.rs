//! Survey schema and submission endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use smes_common::answers::{normalize_answers, AnswerMap};
use smes_common::db;
use smes_common::events::StoreEvent;
use smes_common::schema::{self, QuestionDef};

use crate::AppState;

/// One section of the questionnaire as served to the form renderer
#[derive(Debug, Serialize)]
pub struct SchemaSection {
    pub id: &'static str,
    pub title: &'static str,
    pub questions: Vec<&'static QuestionDef>,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub sections: Vec<SchemaSection>,
}

/// GET /api/survey/schema
///
/// The question registry, grouped by section, for the form renderer.
pub async fn get_schema() -> Json<SchemaResponse> {
    let sections = schema::SECTIONS
        .iter()
        .map(|section| SchemaSection {
            id: section.id,
            title: section.title,
            questions: schema::questions()
                .iter()
                .filter(|q| q.section == section.id)
                .collect(),
        })
        .collect();

    Json(SchemaResponse { sections })
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: String,
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// GET /api/survey/status/:id
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, SurveyError> {
    let user = db::users::get(&state.db, &id)
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?
        .ok_or_else(|| SurveyError::UnknownUser(id))?;

    Ok(Json(StatusResponse {
        id: user.id,
        submitted: user.submitted,
        submitted_at: user.submitted_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub user_id: String,
    #[serde(default)]
    pub answers: AnswerMap,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

/// POST /api/survey/submit
///
/// Validates the submission against the registry, upserts the response
/// document (merge semantics), and flips the user's submitted flag.
/// Re-submission by the same participant overwrites the previous answers.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, SurveyError> {
    let answers = normalize_answers(request.answers);

    let missing = schema::validate_answers(&answers);
    if !missing.is_empty() {
        return Err(SurveyError::Validation(missing));
    }

    let user = db::users::get(&state.db, &request.user_id)
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?
        .ok_or_else(|| SurveyError::UnknownUser(request.user_id.clone()))?;

    let submitted_at = Utc::now();
    db::responses::upsert_merge(&state.db, &user.id, answers, submitted_at)
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?;
    db::users::mark_submitted(&state.db, &user.id, submitted_at)
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?;

    info!("Survey submitted by {}", user.id);
    state.bus.emit_lossy(StoreEvent::responses_changed(&user.id));
    state.bus.emit_lossy(StoreEvent::users_changed(&user.id));

    Ok(Json(SubmitResponse {
        status: "ok".to_string(),
        submitted_at,
    }))
}

/// Survey API errors
#[derive(Debug)]
pub enum SurveyError {
    /// Required questions unanswered; carries the question labels
    Validation(Vec<String>),
    UnknownUser(String),
    Database(String),
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        match self {
            SurveyError::Validation(missing) => {
                let body = Json(json!({
                    "error": "Please answer all required questions",
                    "missing": missing,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            SurveyError::UnknownUser(id) => {
                let body = Json(json!({
                    "error": format!("Unknown user: {}", id),
                }));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            SurveyError::Database(msg) => {
                let body = Json(json!({
                    "error": format!("Database error: {}", msg),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
