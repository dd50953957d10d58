// src/utils/ticket_id.rs

use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};

const SUFFIX_LEN: usize = 10;

/// Builds a ticket id from the creation time and a random suffix,
/// e.g. `18f3a1c2b7e-Xk29QmPz0a`.
///
/// Unique enough to stop casual forgery of navigation parameters on a local
/// device. This is NOT a security token: the prefix is just the creation
/// time and the suffix is only ten alphanumeric characters (about 60 bits).
/// A networked deployment should switch to a full-length random identifier.
pub fn generate(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("{:x}-{}", now.timestamp_millis(), suffix)
}
