// src/handlers/history.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, session::SessionService};

/// Lists every confirmed score, oldest first.
pub async fn list_scores(
    State(sessions): State<Arc<SessionService>>,
) -> Result<impl IntoResponse, AppError> {
    let scores = sessions.history().await?;
    Ok(Json(scores))
}
