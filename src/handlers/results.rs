// src/handlers/results.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{RawQuery, State},
    response::IntoResponse,
};

use crate::{
    models::redemption::RedeemResponse,
    session::SessionService,
    utils::params::parse_results_query,
};

/// Unlocks the results screen.
///
/// Query: `?ticket=<id>&score=<n>&totalQuestions=<n>`. Every parameter is
/// untrusted and parsed leniently. The response is always 200 OK: either
/// `accepted: true` with the recorded score, or `accepted: false` with a
/// uniform "Invalid access" message and a diagnostic `reason`.
pub async fn redeem_results(
    State(sessions): State<Arc<SessionService>>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let claim = parse_results_query(query.as_deref());

    let response = match sessions.redeem(&claim).await {
        Ok(redemption) => RedeemResponse::from(redemption),
        Err(e) => {
            tracing::error!("Results access refused after storage failure: {}", e);
            RedeemResponse::rejected("storage_failure")
        }
    };

    Json(response)
}
