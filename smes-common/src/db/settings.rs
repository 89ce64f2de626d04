//! Settings database operations
//!
//! Get/set accessors for the settings table following the key-value
//! pattern. Values are stored as text and parsed on read.

use sqlx::SqlitePool;
use std::str::FromStr;

use crate::{Error, Result};

/// Read a setting, parsing it to the requested type.
///
/// Returns `Ok(None)` when the key is absent or its value is NULL; a value
/// that fails to parse is an error (the table is service-managed, so a
/// parse failure means corruption rather than user input).
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match row {
        Some((Some(value),)) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Setting '{}' has unparseable value", key))),
        _ => Ok(None),
    }
}

/// Write a setting, replacing any existing value
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

/// Insert a setting only if it does not exist yet
pub async fn ensure_setting(db: &SqlitePool, key: &str, default: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default)
        .execute(db)
        .await?;

    Ok(())
}
