//! API authentication via timestamp and hash validation
//!
//! Administrative endpoints are protected by a shared-secret scheme:
//! every request body carries a `timestamp` (Unix epoch ms) and a `hash`
//! (SHA-256 over the canonical request JSON plus the secret). The secret
//! lives in the settings table; the special value 0 disables checking.
//!
//! This module contains only pure functions and database operations; the
//! HTTP middleware lives in the service crate.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

/// Accepted clock skew: at most 1000ms in the past, 1ms in the future
const MAX_PAST_MS: i64 = 1000;
const MAX_FUTURE_MS: i64 = 1;

const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Authentication error types
#[derive(Debug, Clone)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    InvalidHash { provided: String, calculated: String },

    /// Database error loading shared secret
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::InvalidTimestamp { reason, .. } => {
                write!(f, "Invalid timestamp: {}", reason)
            }
            ApiAuthError::InvalidHash { .. } => write!(f, "Invalid hash"),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Load the shared secret from the settings table, generating and storing
/// one on first use.
///
/// The special value 0 disables auth checking entirely.
#[cfg(feature = "sqlx")]
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = 'api_shared_secret'")
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate a crypto-random non-zero secret and store it
#[cfg(feature = "sqlx")]
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('api_shared_secret', ?)")
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

/// Validate a request timestamp.
///
/// The asymmetric window tolerates processing delay on the past side but
/// only clock drift on the future side.
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;

    let diff = now - timestamp;

    if diff > MAX_PAST_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", diff, MAX_PAST_MS),
        });
    }

    if diff < -MAX_FUTURE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.abs(),
                MAX_FUTURE_MS
            ),
        });
    }

    Ok(())
}

/// Calculate the request hash.
///
/// 1. Replace the hash field with a dummy hash (64 zeros)
/// 2. Convert to canonical JSON (sorted keys, no whitespace)
/// 3. Append the shared secret as a decimal i64 string
/// 4. SHA-256 the concatenation, hex-encoded
pub fn calculate_hash(json_value: &Value, shared_secret: i64) -> String {
    let mut value = json_value.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(DUMMY_HASH.to_string()));
    }

    let canonical = to_canonical_json(&value);
    let to_hash = format!("{}{}", canonical, shared_secret);

    let mut hasher = Sha256::new();
    hasher.update(to_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("\"{}\":{}", k, to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Validate that the provided hash matches the calculated value
pub fn validate_hash(
    provided: &str,
    json_value: &Value,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(json_value, shared_secret);

    if provided == calculated {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidHash {
            provided: provided.to_string(),
            calculated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64
    }

    #[test]
    fn test_current_timestamp_valid() {
        assert!(validate_timestamp(now_ms()).is_ok());
        assert!(validate_timestamp(now_ms() - 500).is_ok());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        assert!(validate_timestamp(now_ms() - 2000).is_err());
    }

    #[test]
    fn test_future_timestamp_rejected() {
        assert!(validate_timestamp(now_ms() + 5000).is_err());
    }

    #[test]
    fn test_hash_round_trip() {
        let body = json!({
            "user_id": "abc123",
            "timestamp": 1730000000000i64,
            "hash": "dummy"
        });
        let secret = 987654321i64;

        let hash = calculate_hash(&body, secret);
        assert_eq!(hash.len(), 64);
        assert!(validate_hash(&hash, &body, secret).is_ok());
        assert!(validate_hash(DUMMY_HASH, &body, secret).is_err());
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({"z": 3, "a": 1, "m": [1, 2]});
        assert_eq!(to_canonical_json(&value), "{\"a\":1,\"m\":[1,2],\"z\":3}");
    }

    #[test]
    fn test_hash_independent_of_key_order() {
        let a = json!({"user_id": "u", "timestamp": 1i64, "hash": "x"});
        let b = json!({"timestamp": 1i64, "hash": "y", "user_id": "u"});
        // Hash field is replaced before hashing, key order canonicalized
        assert_eq!(calculate_hash(&a, 42), calculate_hash(&b, 42));
    }
}
