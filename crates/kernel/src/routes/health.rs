//! Health check endpoint.
//!
//! Returns 200 OK with the number of linked handlers and configured providers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    handlers: usize,
    providers: Vec<String>,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        handlers: state.catalog().len(),
        providers: state
            .engine()
            .provider_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
