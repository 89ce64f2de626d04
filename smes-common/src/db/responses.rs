//! Response document operations
//!
//! The answers document is stored as a JSON column. Keys are normalized at
//! ingestion (both on write and on load), so no read site needs to know
//! about legacy spellings.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::answers::{normalize_answers, AnswerMap};
use crate::db::models::ResponseRecord;
use crate::{Error, Result};

type ResponseRow = (String, String, Option<DateTime<Utc>>);

fn from_row(row: ResponseRow) -> ResponseRecord {
    // A document that fails to decode is treated as having no answers;
    // aggregation and export see it as uniformly unanswered.
    let answers: AnswerMap = match serde_json::from_str(&row.1) {
        Ok(map) => normalize_answers(map),
        Err(e) => {
            warn!("Malformed answers document for {}: {}", row.0, e);
            AnswerMap::new()
        }
    };

    ResponseRecord {
        id: row.0,
        answers,
        submitted_at: row.2,
    }
}

/// Upsert a response document with merge semantics.
///
/// Existing answer keys not present in `answers` are retained; keys present
/// in both take the new value. Safe to call repeatedly for the same user
/// (idempotent for identical input).
pub async fn upsert_merge(
    db: &SqlitePool,
    id: &str,
    answers: AnswerMap,
    submitted_at: DateTime<Utc>,
) -> Result<()> {
    let answers = normalize_answers(answers);

    let mut tx = db.begin().await?;

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT answers FROM responses WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let mut merged = match existing {
        Some((json,)) => match serde_json::from_str::<AnswerMap>(&json) {
            Ok(map) => normalize_answers(map),
            Err(e) => {
                warn!("Replacing malformed answers document for {}: {}", id, e);
                AnswerMap::new()
            }
        },
        None => AnswerMap::new(),
    };
    merged.extend(answers);

    let json = serde_json::to_string(&merged)
        .map_err(|e| Error::Internal(format!("Failed to encode answers: {}", e)))?;

    sqlx::query(
        "INSERT INTO responses (id, answers, submitted_at) VALUES (?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET answers = excluded.answers,
                                       submitted_at = excluded.submitted_at",
    )
    .bind(id)
    .bind(json)
    .bind(submitted_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}

/// Look up a response document by identifier
pub async fn get(db: &SqlitePool, id: &str) -> Result<Option<ResponseRecord>> {
    let row: Option<ResponseRow> =
        sqlx::query_as("SELECT id, answers, submitted_at FROM responses WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;

    Ok(row.map(from_row))
}

/// All response documents
pub async fn list(db: &SqlitePool) -> Result<Vec<ResponseRecord>> {
    let rows: Vec<ResponseRow> =
        sqlx::query_as("SELECT id, answers, submitted_at FROM responses ORDER BY id")
            .fetch_all(db)
            .await?;

    Ok(rows.into_iter().map(from_row).collect())
}

/// Administrative deletion of a response document.
///
/// The caller also clears the owning user's submitted flag; the two writes
/// are separate statements on purpose (the original flow tolerates a
/// deleted response with a stale flag until the next refresh).
pub async fn delete(db: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM responses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}
