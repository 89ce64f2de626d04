//! Export download endpoint

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::export::{build_rows, build_workbook, codebook_rows, to_csv, ExportScope};
use crate::AppState;

/// Query parameters for GET /api/export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// "csv" (default) or "xlsx"
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub scope: ExportScope,
    /// One-hot encode multi-choice questions
    #[serde(default)]
    pub wide: bool,
    /// Include the codebook sheet (xlsx only)
    #[serde(default)]
    pub codebook: bool,
}

fn default_format() -> String {
    "csv".to_string()
}

/// GET /api/export?format=&scope=&wide=&codebook=
pub async fn run_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ExportError> {
    let snapshot = state.snapshot.current();
    let set = build_rows(&snapshot.responses, &snapshot.users, query.scope, query.wide);
    let date = Utc::now().format("%Y-%m-%d");

    info!(
        "Export: format={}, scope={:?}, wide={}, codebook={}, rows={}",
        query.format,
        query.scope,
        query.wide,
        query.codebook,
        set.rows.len()
    );

    match query.format.as_str() {
        "csv" => {
            let body = to_csv(&set);
            Ok(download_response(
                body.into_bytes(),
                "text/csv; charset=utf-8",
                &format!("smes_survey_{}.csv", date),
            ))
        }
        "xlsx" => {
            let codebook = query.codebook.then(codebook_rows);
            let body = build_workbook(&set, codebook.as_ref())
                .map_err(|e| ExportError::Workbook(e.to_string()))?;
            Ok(download_response(
                body,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                &format!("smes_survey_{}.xlsx", date),
            ))
        }
        other => Err(ExportError::UnknownFormat(other.to_string())),
    }
}

fn download_response(body: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Export API errors
#[derive(Debug)]
pub enum ExportError {
    UnknownFormat(String),
    Workbook(String),
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ExportError::UnknownFormat(format) => (
                StatusCode::BAD_REQUEST,
                format!("Unknown export format: {}", format),
            ),
            ExportError::Workbook(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Workbook build failed: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
