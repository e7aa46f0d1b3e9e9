//! Demo pages following the `/{controller}/{action}` convention.
//!
//! Each page runs its demo action, then resolves the configured navigation
//! contexts plus the sub-navigation of every active entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;

use crate::demo::{self, ActionContext};
use crate::error::{AppError, AppResult};
use crate::menu::{NavItem, NavRequest};
use crate::state::AppState;

/// Page response body.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub controller: String,
    pub action: String,
    pub message: String,
    /// Resolved items keyed by context.
    pub navigation: BTreeMap<String, Vec<NavItem>>,
}

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page))
        .route("/{controller}", get(page))
        .route("/{controller}/{action}", get(page))
}

async fn page(
    State(state): State<AppState>,
    Extension(nav): Extension<Arc<NavRequest>>,
) -> AppResult<Json<PageResponse>> {
    let route = nav.route().clone();
    let (handler, action) = state
        .catalog()
        .find_action(&route.controller, &route.action)
        .ok_or(AppError::NotFound)?;
    let controller = handler.controller_name();

    let ctx = ActionContext {
        engine: state.engine(),
        nav: &nav,
    };
    let message = demo::dispatch(&controller, action.name, &ctx).ok_or(AppError::NotFound)?;

    let engine = state.engine();
    let mut navigation = BTreeMap::new();
    for context in state.nav_contexts() {
        let items = engine.resolve(&nav, context)?;
        let open: Vec<String> = items
            .iter()
            .filter(|i| i.is_active && i.has_sub_context())
            .map(|i| i.sub_context.clone())
            .collect();
        navigation.insert(context.clone(), items);

        for sub_context in open {
            if !navigation.contains_key(&sub_context) {
                let sub_items = engine.resolve(&nav, &sub_context)?;
                navigation.insert(sub_context, sub_items);
            }
        }
    }

    Ok(Json(PageResponse {
        controller,
        action: action.name.to_string(),
        message,
        navigation,
    }))
}
