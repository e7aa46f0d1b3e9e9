//! Wayfinder test utilities.
//!
//! Helpers for integration testing: item fixtures, role sources with fixed
//! or failing membership, request builders and an engine preset for the
//! inactive-branch policies.

use std::sync::Arc;

use anyhow::anyhow;
use serde_json::Value as JsonValue;
use wayfinder_kernel::menu::{
    InactiveNavBehavior, NavEngine, NavItem, NavRegistry, NavRequest, RoleSource, StaticProvider,
};

/// Create an action item pointing at `controller`/`action`.
pub fn action_item(title: &str, controller: &str, action: &str) -> NavItem {
    NavItem::action(title, action, controller)
}

/// Create a URL item.
pub fn url_item(title: &str, url: &str) -> NavItem {
    NavItem::url(title, url)
}

/// Create a placeholder item that opens `sub_context`.
pub fn branch_item(title: &str, sub_context: &str) -> NavItem {
    NavItem::new(title).with_sub_context(sub_context)
}

/// Role source returning the same membership for every request.
#[derive(Debug, Clone, Default)]
pub struct FixedRoles(pub Vec<String>);

impl FixedRoles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }
}

impl RoleSource for FixedRoles {
    fn current_roles(&self, _request: &NavRequest) -> anyhow::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Role source that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRoles;

impl RoleSource for FailingRoles {
    fn current_roles(&self, _request: &NavRequest) -> anyhow::Result<Vec<String>> {
        Err(anyhow!("membership backend unavailable"))
    }
}

/// Create a request for `controller`/`action` from a caller holding no roles.
pub fn anonymous_request(controller: &str, action: &str) -> NavRequest {
    NavRequest::new(controller, action).with_user_roles(Vec::<String>::new())
}

/// Create a request with no role membership attached at all.
///
/// The default role source cannot answer for it, so filtering fails open.
pub fn request_without_roles(controller: &str, action: &str) -> NavRequest {
    NavRequest::new(controller, action)
}

/// Create a request for `controller`/`action` carrying `roles`.
pub fn request_as(controller: &str, action: &str, roles: &[&str]) -> NavRequest {
    NavRequest::new(controller, action).with_user_roles(roles.iter().copied())
}

/// The admin tree used by the policy tests.
///
/// `MainNav` holds "Home" and an "Admin" branch restricted to
/// `Administrators`; `AdminSubNav` holds "Users" (open to everyone) and
/// "Audit" (restricted).
pub fn admin_tree() -> StaticProvider {
    StaticProvider::new("admin-tree")
        .with_item("MainNav", action_item("Home", "Home", "Index").with_ordering_hint(0))
        .with_item(
            "MainNav",
            branch_item("Admin", "AdminSubNav")
                .with_roles("Administrators")
                .with_ordering_hint(10),
        )
        .with_item(
            "AdminSubNav",
            action_item("Users", "Admin", "Users").with_ordering_hint(0),
        )
        .with_item(
            "AdminSubNav",
            action_item("Audit", "Admin", "Audit")
                .with_roles("Administrators")
                .with_ordering_hint(1),
        )
}

/// An engine over [`admin_tree`] with the given behavior and no registry items.
pub fn policy_engine(behavior: InactiveNavBehavior) -> NavEngine {
    NavEngine::builder()
        .registry(Arc::new(NavRegistry::new()))
        .provider(admin_tree())
        .inactive_behavior(behavior)
        .build()
}

/// Titles of resolved items, in order.
pub fn titles(items: &[NavItem]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

/// Assertion helpers for resolved navigation.
pub mod assert {
    use super::*;

    /// Assert that `items` has exactly these titles, in order.
    pub fn titles_eq(items: &[NavItem], expected: &[&str]) {
        assert_eq!(
            titles(items),
            expected,
            "unexpected navigation titles: {items:#?}"
        );
    }

    /// Assert that the item titled `title` is present and active.
    pub fn active(items: &[NavItem], title: &str) {
        let item = items
            .iter()
            .find(|i| i.title == title)
            .unwrap_or_else(|| panic!("no item titled '{title}' in {:?}", titles(items)));
        assert!(item.is_active, "expected '{title}' to be active");
    }

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &JsonValue, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }
}
