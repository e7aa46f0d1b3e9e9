//! Navigation request middleware.
//!
//! Attaches a fresh [`NavRequest`] to every request so handlers and the
//! navigation engine share one request-scoped auxiliary-value bag.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::menu::{NavRequest, RouteInfo, split_roles};
use crate::state::AppState;

/// Header carrying the caller's roles, separated like item roles.
///
/// Requests without it are anonymous and hold no roles.
pub const ROLES_HEADER: &str = "x-user-roles";

const DEFAULT_CONTROLLER: &str = "Home";
const DEFAULT_ACTION: &str = "Index";

/// Middleware creating the per-request navigation state.
pub async fn attach_nav_request(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let route = route_from_path(request.uri().path());
    let nav = NavRequest::for_route(route)
        .with_catalog(Arc::clone(state.catalog()))
        .with_user_roles(caller_roles(request.headers()));

    request.extensions_mut().insert(Arc::new(nav));
    next.run(request).await
}

/// Roles named by the roles header; empty for anonymous callers.
///
/// A header that is not valid text counts as anonymous.
pub fn caller_roles(headers: &HeaderMap) -> Vec<String> {
    headers
        .get(ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|roles| split_roles(roles).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Map a path onto the `/{controller}/{action}` convention.
///
/// Missing segments default to `Home` and `Index`.
pub fn route_from_path(path: &str) -> RouteInfo {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let controller = segments.next().unwrap_or(DEFAULT_CONTROLLER);
    let action = segments.next().unwrap_or(DEFAULT_ACTION);
    RouteInfo::new(controller, action)
}
