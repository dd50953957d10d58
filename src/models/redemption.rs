// src/models/redemption.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::score_record::ScoreRecord;

/// What the results screen was asked to show, after lenient parsing.
/// None of these values are trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsClaim {
    pub ticket: Option<String>,
    pub score: Option<i64>,
    pub total: Option<i64>,
}

/// Why a redemption was refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    SessionMissing,
    AlreadyUsed,
    NotCompleted,
    ParamsTampered,
    Expired,
}

impl RejectionReason {
    /// Diagnostic tag sent in `RedeemResponse::reason`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::SessionMissing => "session_missing",
            RejectionReason::AlreadyUsed => "already_used",
            RejectionReason::NotCompleted => "not_completed",
            RejectionReason::ParamsTampered => "params_tampered",
            RejectionReason::Expired => "expired",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::SessionMissing => "session missing",
            RejectionReason::AlreadyUsed => "ticket already used",
            RejectionReason::NotCompleted => "quiz not completed",
            RejectionReason::ParamsTampered => "parameters do not match the recorded result",
            RejectionReason::Expired => "ticket expired",
        };
        f.write_str(text)
    }
}

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    /// Carries the stored score, never the caller's claim.
    Accepted(ScoreRecord),
    Rejected(RejectionReason),
}

impl Redemption {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Redemption::Accepted(_))
    }
}

/// DTO returned to the results screen.
///
/// Every rejection renders the same "Invalid access" view; `reason` is only
/// there for diagnostics.
#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const INVALID_ACCESS_MESSAGE: &str = "Invalid access";

impl RedeemResponse {
    pub fn rejected(reason: &str) -> Self {
        Self {
            accepted: false,
            score: None,
            total: None,
            reason: Some(reason.to_string()),
            message: Some(INVALID_ACCESS_MESSAGE.to_string()),
        }
    }
}

impl From<Redemption> for RedeemResponse {
    fn from(redemption: Redemption) -> Self {
        match redemption {
            Redemption::Accepted(record) => Self {
                accepted: true,
                score: Some(record.score),
                total: Some(record.total_questions),
                reason: None,
                message: None,
            },
            Redemption::Rejected(reason) => Self::rejected(reason.as_str()),
        }
    }
}

/// DTO sent by the quiz flow when an attempt ends.
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    #[validate(range(min = 0, message = "Score cannot be negative."))]
    pub score: i64,
}

/// DTO returned when a ticket is opened.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenResponse {
    pub ticket: String,
    pub expected_total: i64,
    /// Seconds until the ticket can no longer be redeemed.
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_rejection_maps_to_uniform_message() {
        let response = RedeemResponse::from(Redemption::Rejected(RejectionReason::ParamsTampered));
        assert!(!response.accepted);
        assert_eq!(response.reason.as_deref(), Some("params_tampered"));
        assert_eq!(response.message.as_deref(), Some(INVALID_ACCESS_MESSAGE));
        assert_eq!(response.score, None);
    }

    #[test]
    fn test_reason_tags_match_serde_names() {
        for reason in [
            RejectionReason::SessionMissing,
            RejectionReason::AlreadyUsed,
            RejectionReason::NotCompleted,
            RejectionReason::ParamsTampered,
            RejectionReason::Expired,
        ] {
            assert_eq!(serde_json::to_value(reason).unwrap(), reason.as_str());
        }
    }

    #[test]
    fn test_acceptance_carries_stored_values() {
        let record = ScoreRecord {
            score: 7,
            total_questions: 10,
            timestamp: Utc::now(),
        };
        let response = RedeemResponse::from(Redemption::Accepted(record));
        assert!(response.accepted);
        assert_eq!(response.score, Some(7));
        assert_eq!(response.total, Some(10));
        assert_eq!(response.reason, None);
    }
}
