//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod nav;
pub mod page;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
///
/// Middleware layers (last added = first executed in request flow):
/// TraceLayer → nav request → routes
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(metrics::router())
        .merge(nav::router())
        .merge(page::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::attach_nav_request,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
