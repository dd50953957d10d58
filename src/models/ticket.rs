// src/models/ticket.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One quiz attempt's hand-off record, stored in the `pendingSessions` slot.
///
/// Serialized with camelCase keys, e.g.
/// `{"id":"..","createdAt":1718000000000,"expectedTotal":10,"completed":false,"used":false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,

    /// Milliseconds since the Unix epoch.
    pub created_at: i64,

    /// Number of questions the attempt was opened with.
    pub expected_total: i64,

    /// The true score, recorded at completion. `None` until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<i64>,

    #[serde(default)]
    pub completed: bool,

    /// Set once, on the one successful redemption.
    #[serde(default)]
    pub used: bool,
}

impl Ticket {
    pub fn new(id: String, created_at: DateTime<Utc>, expected_total: i64) -> Self {
        Self {
            id,
            created_at: created_at.timestamp_millis(),
            expected_total,
            final_score: None,
            completed: false,
            used: false,
        }
    }

    /// Milliseconds elapsed between creation and `now`.
    pub fn age_millis(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis() - self.created_at
    }
}
