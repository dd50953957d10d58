// src/utils/params.rs

//! Parsing of the untrusted results-screen parameters.
//!
//! The results flow is reached through a query string the user can edit
//! freely. Everything here is lenient: a missing, empty, repeated or
//! non-numeric value becomes `None` instead of an error, and the validator
//! decides what that means.

use url::form_urlencoded;

use crate::models::redemption::ResultsClaim;

/// Parses `ticket`, `score` and `totalQuestions` (or `total`) out of a raw
/// query string. For repeated keys the first occurrence wins.
pub fn parse_results_query(query: Option<&str>) -> ResultsClaim {
    let mut ticket = None;
    let mut score = None;
    let mut total = None;

    for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        let slot = match &*key {
            "ticket" | "session" => &mut ticket,
            "score" => &mut score,
            "totalQuestions" | "total" => &mut total,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    ResultsClaim {
        ticket: ticket.and_then(non_empty),
        score: score.as_deref().and_then(parse_count),
        total: total.as_deref().and_then(parse_count),
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whole decimal numbers only; `"7.5"`, `"7abc"` and `""` are rejected.
pub fn parse_count(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
