// src/models/score_record.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed quiz result, appended to the `scores` slot on redemption.
/// Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub score: i64,
    pub total_questions: i64,

    /// Redemption time, serialized as an RFC 3339 string.
    pub timestamp: DateTime<Utc>,
}
