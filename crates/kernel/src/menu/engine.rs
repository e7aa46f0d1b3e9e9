//! Navigation resolution engine.
//!
//! Resolving a context gathers items from the registry and every provider,
//! expands each item's sub-context into a flat descendant list, filters by
//! the caller's roles (applying the configured [`InactiveNavBehavior`] to
//! disallowed branches), marks active items, overlays request-scoped
//! auxiliary values and sorts by ordering hint.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::error::{NavError, NavResult};
use super::item::{NavItem, NavKind};
use super::provider::NavProvider;
use super::registry::NavRegistry;
use super::request::{NavRequest, RouteInfo};
use super::roles::{RequestRoles, RoleSet, RoleSource};
use crate::metrics::NavMetrics;

/// What to do with a top-level item the caller's roles do not allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveNavBehavior {
    /// Drop the item.
    #[default]
    #[serde(alias = "AlwaysHide")]
    AlwaysHide,
    /// Keep a non-clickable placeholder if any descendant is allowed.
    #[serde(alias = "ShowIfActiveChild")]
    ShowIfActiveChild,
    /// Link to the first allowed descendant under the item's own label.
    #[serde(alias = "RedirectToFirstActive")]
    RedirectToFirstActive,
}

impl FromStr for InactiveNavBehavior {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "alwayshide" => Ok(Self::AlwaysHide),
            "showifactivechild" => Ok(Self::ShowIfActiveChild),
            "redirecttofirstactive" => Ok(Self::RedirectToFirstActive),
            _ => Err(NavError::configuration(format!(
                "unknown inactive nav behavior '{s}'"
            ))),
        }
    }
}

/// A top-level item with its unfiltered, flattened descendants.
struct Branch {
    item: NavItem,
    descendants: Vec<NavItem>,
}

/// Resolves navigation contexts for a request.
///
/// Shared across requests; all per-request state lives on [`NavRequest`].
pub struct NavEngine {
    registry: Arc<NavRegistry>,
    providers: Vec<Arc<dyn NavProvider>>,
    roles: Arc<dyn RoleSource>,
    behavior: InactiveNavBehavior,
    metrics: Arc<NavMetrics>,
}

impl NavEngine {
    pub fn builder() -> NavEngineBuilder {
        NavEngineBuilder::default()
    }

    pub fn registry(&self) -> &Arc<NavRegistry> {
        &self.registry
    }

    pub fn behavior(&self) -> InactiveNavBehavior {
        self.behavior
    }

    pub fn metrics(&self) -> &Arc<NavMetrics> {
        &self.metrics
    }

    /// Names of the configured providers, in call order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn add_item(&self, context: &str, item: Arc<NavItem>) {
        self.registry.add_item(context, item);
    }

    /// See [`NavRegistry::add_item_if_absent`].
    pub fn add_item_if_absent<F>(&self, context: &str, item: Arc<NavItem>, exists: F) -> bool
    where
        F: Fn(&NavItem) -> bool,
    {
        self.registry.add_item_if_absent(context, item, exists)
    }

    pub fn remove_item(&self, context: &str, item: &Arc<NavItem>) -> bool {
        self.registry.remove_item(context, item)
    }

    pub fn remove_context(&self, context: &str) -> bool {
        self.registry.remove_context(context)
    }

    /// Set an auxiliary value for `context` on this request only.
    pub fn set_aux_value(
        &self,
        request: &NavRequest,
        context: &str,
        name: &str,
        value: impl Into<JsonValue>,
    ) {
        let value = value.into();
        request.with_values(|values| values.set(context, name, value));
    }

    pub fn remove_aux_value(&self, request: &NavRequest, context: &str, name: &str) {
        request.with_values(|values| values.remove(context, name));
    }

    pub fn clear_context(&self, request: &NavRequest, context: &str) {
        request.with_values(|values| values.clear_context(context));
    }

    pub fn clear_all(&self, request: &NavRequest) {
        request.with_values(|values| values.clear());
    }

    /// Resolve the items of `context` for this request, ordered by hint.
    ///
    /// A blank context resolves to nothing without consulting providers.
    pub fn resolve(&self, request: &NavRequest, context: &str) -> NavResult<Vec<NavItem>> {
        if context.trim().is_empty() {
            return Ok(Vec::new());
        }
        let started = Instant::now();

        let mut branches = Vec::new();
        for item in self.gather(request, context)? {
            let descendants = if item.has_sub_context() {
                self.gather_subtree(request, &item.sub_context, &[context.to_string()])?
            } else {
                Vec::new()
            };
            branches.push(Branch { item, descendants });
        }

        let mut branches = self.filter_by_roles(request, branches);
        detect_active(request.route(), &mut branches);
        populate_aux_values(request, &mut branches);

        let mut items: Vec<NavItem> = branches.into_iter().map(|b| b.item).collect();
        items.sort_by_key(|i| i.ordering_hint);

        self.metrics
            .record_resolution(context, started.elapsed().as_secs_f64());
        debug!(context = %context, items = items.len(), "resolved navigation");

        Ok(items)
    }

    /// Resolve `context`, keeping only items whose target is of `kind`.
    pub fn resolve_kind(
        &self,
        request: &NavRequest,
        context: &str,
        kind: NavKind,
    ) -> NavResult<Vec<NavItem>> {
        Ok(self
            .resolve(request, context)?
            .into_iter()
            .filter(|i| i.kind() == kind)
            .collect())
    }

    /// Clone every item registered or provided for `context`.
    ///
    /// Registry items come first, then each provider's items in provider
    /// order. Every clone is stamped with `context`.
    fn gather(&self, request: &NavRequest, context: &str) -> NavResult<Vec<NavItem>> {
        let mut sources = self.registry.items(context);
        for provider in &self.providers {
            let provided = provider
                .list_items(request, context)
                .map_err(|e| e.in_provider(provider.name()))?;
            sources.extend(provided);
        }

        Ok(sources
            .iter()
            .map(|source| {
                let mut item = NavItem::clone(source);
                item.context = context.to_string();
                item.is_active = false;
                item
            })
            .collect())
    }

    /// Gather `sub_context` and everything below it into one flat list.
    ///
    /// `chain` holds the contexts already expanded on this path, root
    /// included; revisiting one of them yields an empty branch.
    fn gather_subtree(
        &self,
        request: &NavRequest,
        sub_context: &str,
        chain: &[String],
    ) -> NavResult<Vec<NavItem>> {
        if chain.iter().any(|c| c == sub_context) {
            debug!(
                context = %sub_context,
                chain = %chain.join(" > "),
                "sub-context cycle truncated"
            );
            self.metrics.record_cycle_truncation();
            return Ok(Vec::new());
        }

        let mut chain = chain.to_vec();
        chain.push(sub_context.to_string());

        let mut items = self.gather(request, sub_context)?;
        let nested: Vec<String> = items
            .iter()
            .filter(|i| i.has_sub_context())
            .map(|i| i.sub_context.clone())
            .collect();
        for child in nested {
            let descendants = self.gather_subtree(request, &child, &chain)?;
            items.extend(descendants);
        }

        Ok(items)
    }

    /// Drop or replace top-level items the caller's roles do not allow.
    ///
    /// If the role lookup fails nothing is filtered.
    fn filter_by_roles(&self, request: &NavRequest, branches: Vec<Branch>) -> Vec<Branch> {
        let roles = match self.roles.current_roles(request) {
            Ok(roles) => RoleSet::new(roles),
            Err(e) => {
                warn!(error = %e, "role lookup failed, navigation left unfiltered");
                self.metrics.record_role_lookup_failure();
                return branches;
            }
        };

        let mut kept = Vec::with_capacity(branches.len());
        let mut hidden = 0u64;
        for branch in branches {
            if roles.satisfies(&branch.item.roles) {
                kept.push(branch);
                continue;
            }
            match self.replacement(&roles, &branch) {
                Some(item) => kept.push(Branch {
                    item,
                    descendants: branch.descendants,
                }),
                None => hidden += 1,
            }
        }

        if hidden > 0 {
            self.metrics.record_hidden(hidden);
        }
        kept
    }

    /// Stand-in for a disallowed item, if the behavior and its descendants allow one.
    fn replacement(&self, roles: &RoleSet, branch: &Branch) -> Option<NavItem> {
        if self.behavior == InactiveNavBehavior::AlwaysHide {
            return None;
        }

        let first_allowed = branch
            .descendants
            .iter()
            .find(|d| roles.satisfies(&d.roles))?;

        Some(match self.behavior {
            InactiveNavBehavior::RedirectToFirstActive => branch.item.relabel(first_allowed),
            InactiveNavBehavior::ShowIfActiveChild | InactiveNavBehavior::AlwaysHide => {
                branch.item.placeholder_for()
            }
        })
    }
}

impl std::fmt::Debug for NavEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavEngine")
            .field("registry", &self.registry)
            .field("providers", &self.provider_names())
            .field("behavior", &self.behavior)
            .finish()
    }
}

/// Mark items whose own target or any descendant's matches the route.
fn detect_active(route: &RouteInfo, branches: &mut [Branch]) {
    for branch in branches {
        branch.item.is_active = branch.item.matches_route(&route.action, &route.controller)
            || branch
                .descendants
                .iter()
                .any(|d| d.matches_route(&route.action, &route.controller));
    }
}

/// Overlay the request's values for each item's context onto its own.
fn populate_aux_values(request: &NavRequest, branches: &mut [Branch]) {
    request.with_values(|values| {
        for branch in branches {
            if let Some(overlay) = values.get(&branch.item.context) {
                for (name, value) in overlay {
                    branch.item.aux_values.insert(name.clone(), value.clone());
                }
            }
        }
    });
}

/// Builder for [`NavEngine`].
#[derive(Default)]
pub struct NavEngineBuilder {
    registry: Option<Arc<NavRegistry>>,
    providers: Vec<Arc<dyn NavProvider>>,
    roles: Option<Arc<dyn RoleSource>>,
    behavior: InactiveNavBehavior,
    metrics: Option<Arc<NavMetrics>>,
}

impl NavEngineBuilder {
    /// Use a shared registry instead of a fresh one.
    pub fn registry(mut self, registry: Arc<NavRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Append a provider; providers are consulted in the order added.
    pub fn provider(self, provider: impl NavProvider + 'static) -> Self {
        self.shared_provider(Arc::new(provider))
    }

    pub fn shared_provider(mut self, provider: Arc<dyn NavProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Role membership source (default: roles attached to the request).
    pub fn role_source(mut self, roles: impl RoleSource + 'static) -> Self {
        self.roles = Some(Arc::new(roles));
        self
    }

    pub fn inactive_behavior(mut self, behavior: InactiveNavBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn metrics(mut self, metrics: Arc<NavMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> NavEngine {
        NavEngine {
            registry: self.registry.unwrap_or_default(),
            providers: self.providers,
            roles: self.roles.unwrap_or_else(|| Arc::new(RequestRoles)),
            behavior: self.behavior,
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}
