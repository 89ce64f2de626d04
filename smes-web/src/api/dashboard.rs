//! Dashboard read endpoints
//!
//! All handlers are pure views over the current snapshot; none of them
//! touch the database. A stale snapshot (watcher stopped) degrades to a
//! stale dashboard, nothing more.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smes_common::db::UserRecord;
use smes_common::schema;

use crate::export::rows::narrow_value;
use crate::pagination::calculate_pagination;
use crate::report::{all_charts, compute_funnel, compute_kpis, survey_checkpoints};
use crate::report::{ChartConfig, FunnelStage, Kpis};
use crate::AppState;

/// GET /api/dashboard/kpis
pub async fn get_kpis(State(state): State<AppState>) -> Json<Kpis> {
    let snapshot = state.snapshot.current();
    Json(compute_kpis(&snapshot.users, &snapshot.responses))
}

/// GET /api/dashboard/charts
pub async fn get_charts(State(state): State<AppState>) -> Json<Vec<ChartConfig>> {
    let snapshot = state.snapshot.current();
    Json(all_charts(&snapshot.responses))
}

/// GET /api/dashboard/funnel
pub async fn get_funnel(State(state): State<AppState>) -> Json<Vec<FunnelStage>> {
    let snapshot = state.snapshot.current();
    let total = snapshot.users.len() as u64;
    let completed = snapshot.users.iter().filter(|u| u.submitted).count() as u64;
    let checkpoints = survey_checkpoints(total, completed);
    Json(compute_funnel(&checkpoints, &snapshot.responses))
}

/// Query parameters for the user table
#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    /// Case-insensitive match over email, name, and id
    #[serde(default)]
    pub search: String,
    /// "all" (default), "completed", or "in_progress"
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_status() -> String {
    "all".to_string()
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub users: Vec<UserSummary>,
}

fn matches_search(user: &UserRecord, needle: &str) -> bool {
    user.email.to_lowercase().contains(needle)
        || user.name.to_lowercase().contains(needle)
        || user.id.to_lowercase().contains(needle)
}

/// GET /api/dashboard/users?search=&status=&page=
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Json<UsersResponse> {
    let snapshot = state.snapshot.current();
    let needle = query.search.to_lowercase();

    let filtered: Vec<&UserRecord> = snapshot
        .users
        .iter()
        .filter(|u| needle.is_empty() || matches_search(u, &needle))
        .filter(|u| match query.status.as_str() {
            "completed" => u.submitted,
            "in_progress" => !u.submitted,
            _ => true,
        })
        .collect();

    let total = filtered.len() as i64;
    let pagination = calculate_pagination(total, query.page);
    let users = filtered
        .into_iter()
        .skip(pagination.offset as usize)
        .take(crate::pagination::PAGE_SIZE as usize)
        .map(|u| UserSummary {
            id: u.id.clone(),
            email: u.email.clone(),
            name: u.name.clone(),
            submitted: u.submitted,
            submitted_at: u.submitted_at,
        })
        .collect();

    Json(UsersResponse {
        total,
        page: pagination.page,
        total_pages: pagination.total_pages,
        users,
    })
}

#[derive(Debug, Serialize)]
pub struct TableResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// GET /api/dashboard/table
///
/// Detailed grid: one row per response, one column per question (plus
/// comment companions), values rendered the narrow-export way.
pub async fn get_table(State(state): State<AppState>) -> Json<TableResponse> {
    let snapshot = state.snapshot.current();

    let mut columns = vec![
        "User_ID".to_string(),
        "Status".to_string(),
        "Submitted_At".to_string(),
    ];
    for q in schema::questions() {
        columns.push(q.label.to_string());
        if q.allow_comment {
            columns.push(format!("{} Comment", q.label));
        }
    }

    let rows = snapshot
        .responses
        .iter()
        .map(|response| {
            let user = snapshot.users.iter().find(|u| u.id == response.id);
            let submitted = user.is_some_and(|u| u.submitted);

            let mut row = vec![
                response.id.clone(),
                if submitted { "Done" } else { "Pending" }.to_string(),
                user.and_then(|u| u.submitted_at)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ];

            for q in schema::questions() {
                row.push(narrow_value(response.answers.get(q.key)));
                if q.allow_comment {
                    row.push(narrow_value(
                        response.answers.get(&schema::comment_key(q.key)),
                    ));
                }
            }

            row
        })
        .collect();

    Json(TableResponse { columns, rows })
}
