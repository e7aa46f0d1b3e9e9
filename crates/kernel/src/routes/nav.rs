//! Navigation API.
//!
//! `GET /nav/{context}` resolves one context for an explicit route given in
//! the query string, with the caller's roles taken from the request.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::menu::{NavItem, NavKind, NavRequest, RouteInfo};
use crate::state::AppState;

/// Query parameters for the navigation API.
#[derive(Debug, Deserialize)]
pub struct NavQuery {
    pub controller: Option<String>,
    pub action: Option<String>,
    /// Only return items of this kind: "action", "url" or "placeholder".
    pub kind: Option<String>,
}

/// Create the navigation API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/nav/{context}", get(context_items))
}

async fn context_items(
    State(state): State<AppState>,
    Path(context): Path<String>,
    Query(query): Query<NavQuery>,
    Extension(nav): Extension<Arc<NavRequest>>,
) -> AppResult<Json<Vec<NavItem>>> {
    let route = RouteInfo::new(
        query.controller.as_deref().unwrap_or("Home"),
        query.action.as_deref().unwrap_or("Index"),
    );
    let mut request = NavRequest::for_route(route).with_catalog(Arc::clone(state.catalog()));
    if let Some(roles) = nav.user_roles() {
        request = request.with_user_roles(roles.iter().cloned());
    }

    let engine = state.engine();
    let items = match query.kind.as_deref() {
        None => engine.resolve(&request, &context)?,
        Some(kind) => engine.resolve_kind(&request, &context, parse_kind(kind)?)?,
    };

    Ok(Json(items))
}

fn parse_kind(kind: &str) -> AppResult<NavKind> {
    match kind.to_lowercase().as_str() {
        "action" => Ok(NavKind::Action),
        "url" => Ok(NavKind::Url),
        "placeholder" => Ok(NavKind::Placeholder),
        other => Err(AppError::BadRequest(format!("unknown item kind '{other}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds_case_insensitively() {
        assert_eq!(parse_kind("URL").unwrap(), NavKind::Url);
        assert_eq!(parse_kind("action").unwrap(), NavKind::Action);
        assert!(parse_kind("link").is_err());
    }
}
