//! Handler discovery - navigation items declared on request handlers.
//!
//! Handlers declare navigation entries with `#[nav_controller]`,
//! `#[nav_item(...)]` and `#[authorize(...)]`. The macro emits a
//! [`HandlerDescriptor`] into [`NAV_HANDLERS`] at link time; a
//! [`HandlerCatalog`] collects them and the [`DiscoveryProvider`] turns the
//! catalog into items, grouped by context, once per process.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, LazyLock, OnceLock};

use linkme::distributed_slice;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::info;

use super::error::{NavError, NavResult};
use super::item::{ActionOrigin, ActionTarget, NavItem, NavTarget};
use super::provider::NavProvider;
use super::request::NavRequest;
use super::roles::split_roles;

/// One `#[nav_item(...)]` declaration on an action.
#[derive(Debug)]
pub struct NavDeclaration {
    pub context: &'static str,
    pub sub_context: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub ordering_hint: i32,
    /// Raw render context; parsed as JSON when possible.
    pub render_context: Option<&'static str>,
}

/// An action method on a handler.
#[derive(Debug)]
pub struct ActionDescriptor {
    /// Method name.
    pub name: &'static str,
    /// Role strings from `#[authorize]` on the method.
    pub roles: &'static [&'static str],
    /// Navigation entries declared on the method.
    pub nav: &'static [NavDeclaration],
}

/// Navigation metadata for one request handler type.
#[derive(Debug)]
pub struct HandlerDescriptor {
    /// Type name as written, e.g. `AdminController`.
    pub type_name: &'static str,
    /// Role strings from `#[authorize]` on the impl block.
    pub roles: &'static [&'static str],
    pub actions: &'static [ActionDescriptor],
}

impl HandlerDescriptor {
    /// Controller name used for routing (`AdminController` -> `Admin`).
    pub fn controller_name(&self) -> String {
        controller_name(self.type_name)
    }
}

/// Every handler registered through `#[nav_controller]`.
#[distributed_slice]
pub static NAV_HANDLERS: [HandlerDescriptor];

/// Trailing "Controller" suffix, any case.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static CONTROLLER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)controller$").expect("valid regex literal"));

/// Strip a trailing "Controller" (case-insensitive) from a handler type name.
pub fn controller_name(type_name: &str) -> String {
    CONTROLLER_SUFFIX.replace(type_name, "").into_owned()
}

/// The set of handlers a discovery scan enumerates.
#[derive(Debug, Clone, Default)]
pub struct HandlerCatalog {
    handlers: Vec<&'static HandlerDescriptor>,
}

impl HandlerCatalog {
    /// Collect every handler linked into the binary, ordered by type name.
    ///
    /// Link order is unspecified, so the sort keeps scans repeatable across
    /// builds.
    pub fn linked() -> Self {
        let mut handlers: Vec<_> = NAV_HANDLERS.iter().collect();
        handlers.sort_by_key(|h| h.type_name);
        Self { handlers }
    }

    /// Build a catalog from explicit descriptors, keeping their order.
    pub fn from_descriptors<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = &'static HandlerDescriptor>,
    {
        Self {
            handlers: handlers.into_iter().collect(),
        }
    }

    pub fn handlers(&self) -> &[&'static HandlerDescriptor] {
        &self.handlers
    }

    /// Find an action by controller and action name (case-insensitive).
    pub fn find_action(
        &self,
        controller: &str,
        action: &str,
    ) -> Option<(&'static HandlerDescriptor, &'static ActionDescriptor)> {
        self.handlers
            .iter()
            .filter(|h| h.controller_name().eq_ignore_ascii_case(controller))
            .find_map(|h| {
                h.actions
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(action))
                    .map(|a| (*h, a))
            })
    }

    /// Every context and sub-context named by a declaration in the catalog.
    pub fn declared_contexts(&self) -> BTreeSet<&'static str> {
        self.handlers
            .iter()
            .flat_map(|h| h.actions)
            .flat_map(|a| a.nav)
            .flat_map(|decl| [decl.context, decl.sub_context])
            .filter(|c| !c.trim().is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Union of the action's and handler's roles, deduplicated
/// case-insensitively (first spelling wins) and joined with spaces.
fn extract_roles(handler: &HandlerDescriptor, action: &ActionDescriptor) -> String {
    let mut seen = HashSet::new();
    let roles: Vec<&str> = action
        .roles
        .iter()
        .chain(handler.roles.iter())
        .flat_map(|r| split_roles(r))
        .filter(|r| seen.insert(r.to_lowercase()))
        .collect();
    roles.join(" ")
}

fn parse_render_context(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

/// Turn a catalog into items grouped by context, in discovery order.
pub fn scan_catalog(catalog: &HandlerCatalog) -> HashMap<String, Vec<Arc<NavItem>>> {
    let mut items: HashMap<String, Vec<Arc<NavItem>>> = HashMap::new();

    for handler in catalog.handlers() {
        let controller = handler.controller_name();

        for action in handler.actions {
            if action.nav.is_empty() {
                continue;
            }
            let roles = extract_roles(handler, action);

            for decl in action.nav {
                let item = NavItem {
                    context: decl.context.to_string(),
                    sub_context: decl.sub_context.to_string(),
                    roles: roles.clone(),
                    title: decl.title.to_string(),
                    description: decl.description.to_string(),
                    ordering_hint: decl.ordering_hint,
                    render_context: decl.render_context.map(parse_render_context),
                    target: NavTarget::Action(ActionTarget {
                        action: action.name.to_string(),
                        controller: controller.clone(),
                        origin: ActionOrigin::Discovered,
                    }),
                    ..NavItem::default()
                };
                items
                    .entry(decl.context.to_string())
                    .or_default()
                    .push(Arc::new(item));
            }
        }
    }

    items
}

/// Provider over the navigation entries declared on handlers.
///
/// Items within a context follow catalog order: handlers in the order the
/// catalog lists them (alphabetical by type name for
/// [`HandlerCatalog::linked`]), then actions and declarations in source
/// order. Ordering-hint ties across handlers therefore break by type name.
///
/// The catalog is scanned on first use and the result reused for the
/// lifetime of the provider. Concurrent first calls may both scan; the
/// first stored result wins and the scans are identical.
#[derive(Debug)]
pub struct DiscoveryProvider {
    name: String,
    items: OnceLock<HashMap<String, Vec<Arc<NavItem>>>>,
}

impl DiscoveryProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: OnceLock::new(),
        }
    }

    /// Whether the catalog has been scanned yet.
    pub fn is_scanned(&self) -> bool {
        self.items.get().is_some()
    }

    fn scanned(&self, request: &NavRequest) -> NavResult<&HashMap<String, Vec<Arc<NavItem>>>> {
        if let Some(items) = self.items.get() {
            return Ok(items);
        }

        let catalog = request.catalog().ok_or_else(|| {
            NavError::configuration("handler discovery requires a handler catalog on the request")
        })?;
        let scanned = scan_catalog(catalog);

        info!(
            provider = %self.name,
            handlers = catalog.len(),
            contexts = scanned.len(),
            "scanned handler navigation metadata"
        );

        Ok(self.items.get_or_init(|| scanned))
    }
}

impl Default for DiscoveryProvider {
    fn default() -> Self {
        Self::new("discovery")
    }
}

impl NavProvider for DiscoveryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_items(&self, request: &NavRequest, context: &str) -> NavResult<Vec<Arc<NavItem>>> {
        let items = self.scanned(request)?;
        Ok(items.get(context).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    static ADMIN: HandlerDescriptor = HandlerDescriptor {
        type_name: "AdminController",
        roles: &["Everyone"],
        actions: &[
            ActionDescriptor {
                name: "Index",
                roles: &["Administrators, everyone"],
                nav: &[
                    NavDeclaration {
                        context: "MainNav",
                        sub_context: "AdminSubNav",
                        title: "Admin Pages",
                        description: "",
                        ordering_hint: 999,
                        render_context: Some(r#"{"icon": "lock"}"#),
                    },
                    NavDeclaration {
                        context: "AdminSubNav",
                        sub_context: "",
                        title: "General Admin",
                        description: "",
                        ordering_hint: 0,
                        render_context: Some("plain"),
                    },
                ],
            },
            ActionDescriptor {
                name: "Save",
                roles: &[],
                nav: &[],
            },
        ],
    };

    fn catalog() -> HandlerCatalog {
        HandlerCatalog::from_descriptors([&ADMIN])
    }

    #[test]
    fn linked_catalog_is_ordered_by_type_name() {
        let linked = HandlerCatalog::linked();
        let names: Vec<_> = linked.handlers().iter().map(|h| h.type_name).collect();
        assert!(!names.is_empty());
        assert!(names.windows(2).all(|w| w[0] <= w[1]), "{names:?}");
    }

    #[test]
    fn declared_contexts_include_sub_contexts() {
        let contexts: Vec<_> = catalog().declared_contexts().into_iter().collect();
        assert_eq!(contexts, vec!["AdminSubNav", "MainNav"]);
    }

    #[test]
    fn strips_controller_suffix_case_insensitively() {
        assert_eq!(controller_name("HomeController"), "Home");
        assert_eq!(controller_name("AdminCONTROLLER"), "Admin");
        assert_eq!(controller_name("Controllers"), "Controllers");
        assert_eq!(controller_name("Plain"), "Plain");
    }

    #[test]
    fn roles_union_deduplicates_ignoring_case() {
        let roles = extract_roles(&ADMIN, &ADMIN.actions[0]);
        assert_eq!(roles, "Administrators everyone");
    }

    #[test]
    fn scan_emits_one_item_per_declaration() {
        let items = scan_catalog(&catalog());

        let main = &items["MainNav"];
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].title, "Admin Pages");
        assert_eq!(main[0].sub_context, "AdminSubNav");
        assert!(main[0].matches_route("index", "admin"));
        assert_eq!(main[0].render_context.as_ref().unwrap()["icon"], "lock");

        let sub = &items["AdminSubNav"];
        assert_eq!(sub.len(), 1);
        assert_eq!(sub[0].render_context, Some(JsonValue::from("plain")));
        assert_eq!(
            sub[0].action_target().map(|t| t.origin),
            Some(ActionOrigin::Discovered)
        );
    }

    #[test]
    fn provider_requires_catalog_on_first_use() {
        let provider = DiscoveryProvider::default();
        let request = NavRequest::new("Home", "Index");

        let err = provider.list_items(&request, "MainNav").unwrap_err();
        assert!(matches!(err, NavError::Configuration(_)));
        assert!(!provider.is_scanned());
    }

    #[test]
    fn provider_caches_first_scan() {
        let provider = DiscoveryProvider::default();
        let request = NavRequest::new("Home", "Index").with_catalog(Arc::new(catalog()));

        let first = provider.list_items(&request, "MainNav").unwrap();
        assert_eq!(first.len(), 1);
        assert!(provider.is_scanned());

        // Later requests without a catalog reuse the scan.
        let bare = NavRequest::new("Home", "Index");
        let second = provider.list_items(&bare, "MainNav").unwrap();
        assert!(Arc::ptr_eq(&first[0], &second[0]));
        assert!(provider.list_items(&bare, "Unknown").unwrap().is_empty());
    }

    #[test]
    fn catalog_finds_actions_by_route() {
        let catalog = catalog();
        let (handler, action) = catalog.find_action("admin", "SAVE").unwrap();
        assert_eq!(handler.type_name, "AdminController");
        assert_eq!(action.name, "Save");
        assert!(catalog.find_action("Home", "Index").is_none());
    }
}
