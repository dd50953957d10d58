// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{history, results, session},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges the session, results and history sub-routers.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (session service, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        axum::http::HeaderValue::from_static("http://localhost:8081"),
        axum::http::HeaderValue::from_static("http://127.0.0.1:8081"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let session_routes = Router::new()
        .route("/", post(session::open_session))
        .route("/{id}/complete", post(session::complete_session));

    let results_routes = Router::new().route("/", get(results::redeem_results));

    let history_routes = Router::new().route("/", get(history::list_scores));

    Router::new()
        .nest("/api/sessions", session_routes)
        .nest("/api/results", results_routes)
        .nest("/api/scores", history_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
