//! Per-request navigation state.
//!
//! A [`NavRequest`] is created fresh for every request the host serves. It
//! carries the current route, the caller's role membership (when the host
//! knows it), the handler catalog the discovery provider scans, and the
//! request-scoped auxiliary-value bag.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value as JsonValue;

use super::discovery::HandlerCatalog;
use super::item::AuxValues;

/// Handler identity of the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteInfo {
    pub controller: String,
    pub action: String,
}

impl RouteInfo {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

/// Request-scoped auxiliary values, keyed by context then by name.
#[derive(Debug, Clone, Default)]
pub struct ContextValues {
    contexts: HashMap<String, AuxValues>,
}

impl ContextValues {
    /// Set (or overwrite) a value for a context.
    pub fn set(&mut self, context: &str, name: &str, value: JsonValue) {
        self.contexts
            .entry(context.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Remove a value; missing contexts and names are ignored.
    pub fn remove(&mut self, context: &str, name: &str) {
        if let Some(values) = self.contexts.get_mut(context) {
            values.remove(name);
        }
    }

    pub fn clear_context(&mut self, context: &str) {
        self.contexts.remove(context);
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
    }

    pub fn get(&self, context: &str) -> Option<&AuxValues> {
        self.contexts.get(context)
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.values().all(HashMap::is_empty)
    }
}

/// Navigation state owned by one request.
#[derive(Debug, Default)]
pub struct NavRequest {
    route: RouteInfo,
    user_roles: Option<Vec<String>>,
    catalog: Option<Arc<HandlerCatalog>>,
    values: Mutex<ContextValues>,
}

impl NavRequest {
    /// Create request state for the given controller and action.
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self::for_route(RouteInfo::new(controller, action))
    }

    pub fn for_route(route: RouteInfo) -> Self {
        Self {
            route,
            ..Self::default()
        }
    }

    /// Attach the caller's role membership.
    pub fn with_user_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Attach the handler catalog of the running application.
    pub fn with_catalog(mut self, catalog: Arc<HandlerCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn route(&self) -> &RouteInfo {
        &self.route
    }

    pub fn user_roles(&self) -> Option<&[String]> {
        self.user_roles.as_deref()
    }

    pub fn catalog(&self) -> Option<&Arc<HandlerCatalog>> {
        self.catalog.as_ref()
    }

    /// Run `f` with exclusive access to the auxiliary-value bag.
    pub fn with_values<R>(&self, f: impl FnOnce(&mut ContextValues) -> R) -> R {
        f(&mut self.values.lock())
    }

    /// Copy of the values registered for one context.
    pub fn values_for(&self, context: &str) -> Option<AuxValues> {
        self.values.lock().get(context).cloned()
    }
}
