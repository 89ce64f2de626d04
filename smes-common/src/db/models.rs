//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;

/// A registered participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque stable identifier (shared with the response document)
    pub id: String,
    pub name: String,
    pub email: String,
    /// Flips true exactly once, on survey completion
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A survey response document, keyed by the owning user's identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    /// Question key → answer value, keys normalized at ingestion
    pub answers: AnswerMap,
    pub submitted_at: Option<DateTime<Utc>>,
}
