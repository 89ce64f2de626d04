//! User record operations

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::UserRecord;
use crate::Result;

type UserRow = (
    String,
    String,
    String,
    i64,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

fn from_row(row: UserRow) -> UserRecord {
    UserRecord {
        id: row.0,
        name: row.1,
        email: row.2,
        submitted: row.3 != 0,
        submitted_at: row.4,
        created_at: row.5,
    }
}

const COLUMNS: &str = "id, name, email, submitted, submitted_at, created_at";

/// Create a user record on first authentication.
///
/// The identifier is generated here; the caller is expected to have checked
/// that no record with this email exists yet (see [`find_by_email`]).
pub async fn create(db: &SqlitePool, name: &str, email: &str) -> Result<UserRecord> {
    let record = UserRecord {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        submitted: false,
        submitted_at: None,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (id, name, email, submitted, submitted_at, created_at)
         VALUES (?, ?, ?, 0, NULL, ?)",
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.email)
    .bind(record.created_at)
    .execute(db)
    .await?;

    Ok(record)
}

/// Look up a user by identifier
pub async fn get(db: &SqlitePool, id: &str) -> Result<Option<UserRecord>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await?;

    Ok(row.map(from_row))
}

/// Look up a user by email (sign-in path)
pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<UserRecord>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE email = ?", COLUMNS))
            .bind(email)
            .fetch_optional(db)
            .await?;

    Ok(row.map(from_row))
}

/// All user records, oldest first
pub async fn list(db: &SqlitePool) -> Result<Vec<UserRecord>> {
    let rows: Vec<UserRow> = sqlx::query_as(&format!(
        "SELECT {} FROM users ORDER BY created_at, id",
        COLUMNS
    ))
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(from_row).collect())
}

/// Flip the submitted flag on survey completion
pub async fn mark_submitted(db: &SqlitePool, id: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE users SET submitted = 1, submitted_at = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}

/// Clear the submitted flag (administrative response deletion)
pub async fn clear_submitted(db: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("UPDATE users SET submitted = 0, submitted_at = NULL WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}

/// Administrative user removal
pub async fn delete(db: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}
