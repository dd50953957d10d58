// src/handlers/session.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::redemption::{CompleteRequest, OpenResponse},
    session::SessionService,
};

/// Opens a ticket for a new quiz attempt.
///
/// Returns 201 Created with the ticket id the quiz flow must carry to the
/// results screen.
pub async fn open_session(
    State(sessions): State<Arc<SessionService>>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = sessions.open().await?;

    let body = OpenResponse {
        ticket,
        expected_total: sessions.settings().questions_per_quiz,
        expires_in: sessions.settings().ticket_ttl.as_secs(),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// Records the final score of a finished quiz.
///
/// Failures inside the session core are logged and reported as
/// `completed: false` with 200 OK: the quiz must be able to navigate on
/// whether or not the ticket could be updated.
pub async fn complete_session(
    State(sessions): State<Arc<SessionService>>,
    Path(id): Path<String>,
    Json(payload): Json<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let completed = match sessions.complete(&id, payload.score).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Ignoring completion failure for ticket {}: {}", id, e);
            false
        }
    };

    Ok(Json(json!({ "completed": completed })))
}
