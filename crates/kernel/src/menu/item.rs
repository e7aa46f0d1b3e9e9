//! Navigation item model.
//!
//! A [`NavItem`] carries the fields every entry shares plus a [`NavTarget`]
//! describing what the entry links to. Items handed out by the engine are
//! always owned clones; nothing in a resolved item aliases registry or
//! provider state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Per-item auxiliary values (route parameters, entity ids, ...).
pub type AuxValues = HashMap<String, JsonValue>;

/// One navigation entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    /// Context this item was resolved under (stamped by the engine).
    #[serde(default)]
    pub context: String,
    /// Child context whose items are attached under this item (empty = none).
    #[serde(default)]
    pub sub_context: String,
    /// Required roles, separated by `;`, `,` or spaces (empty = everyone).
    #[serde(default)]
    pub roles: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Additional display text.
    #[serde(default)]
    pub description: String,
    /// Sort key (lower sorts first).
    #[serde(default)]
    pub ordering_hint: i32,
    /// Auxiliary values for the current request.
    #[serde(default)]
    pub aux_values: AuxValues,
    /// True if this item or one of its descendants matches the current route.
    #[serde(default)]
    pub is_active: bool,
    /// Opaque data for the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_context: Option<JsonValue>,
    /// What this item links to.
    #[serde(default)]
    pub target: NavTarget,
}

/// Link target of a navigation item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavTarget {
    /// Plain, non-clickable entry.
    #[default]
    Placeholder,
    /// Link to a request handler.
    Action(ActionTarget),
    /// Raw link. Never matched against the current route.
    Url { url: String },
}

/// Handler identity an action item links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTarget {
    pub action: String,
    pub controller: String,
    #[serde(default)]
    pub origin: ActionOrigin,
}

/// Where an action item came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    /// Added imperatively or from configuration.
    #[default]
    Declared,
    /// Produced by the handler discovery provider.
    Discovered,
}

/// Target kinds, for filtering resolved navigation by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    Placeholder,
    Action,
    Url,
}

impl NavItem {
    /// Create a placeholder item with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Create an item linking to a handler action.
    pub fn action(
        title: impl Into<String>,
        action: impl Into<String>,
        controller: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            target: NavTarget::Action(ActionTarget {
                action: action.into(),
                controller: controller.into(),
                origin: ActionOrigin::Declared,
            }),
            ..Self::default()
        }
    }

    /// Create an item linking to a raw URL.
    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target: NavTarget::Url { url: url.into() },
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_roles(mut self, roles: impl Into<String>) -> Self {
        self.roles = roles.into();
        self
    }

    pub fn with_sub_context(mut self, sub_context: impl Into<String>) -> Self {
        self.sub_context = sub_context.into();
        self
    }

    pub fn with_ordering_hint(mut self, ordering_hint: i32) -> Self {
        self.ordering_hint = ordering_hint;
        self
    }

    pub fn with_aux_value(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.aux_values.insert(name.into(), value.into());
        self
    }

    pub fn with_render_context(mut self, render_context: JsonValue) -> Self {
        self.render_context = Some(render_context);
        self
    }

    /// Whether this item declares a child context.
    pub fn has_sub_context(&self) -> bool {
        !self.sub_context.trim().is_empty()
    }

    /// Handler target, if this is an action item.
    pub fn action_target(&self) -> Option<&ActionTarget> {
        match &self.target {
            NavTarget::Action(target) => Some(target),
            _ => None,
        }
    }

    pub fn kind(&self) -> NavKind {
        match self.target {
            NavTarget::Placeholder => NavKind::Placeholder,
            NavTarget::Action(_) => NavKind::Action,
            NavTarget::Url { .. } => NavKind::Url,
        }
    }

    /// Check whether this item links to the given handler.
    ///
    /// Comparison is case-insensitive; URL and placeholder items never match.
    pub fn matches_route(&self, action: &str, controller: &str) -> bool {
        self.action_target().is_some_and(|target| {
            target.action.eq_ignore_ascii_case(action)
                && target.controller.eq_ignore_ascii_case(controller)
        })
    }

    /// Non-clickable stand-in for a branch the caller may not open.
    ///
    /// Keeps the display fields, roles, sub-context and auxiliary values but
    /// drops the link identity.
    pub(crate) fn placeholder_for(&self) -> Self {
        Self {
            context: self.context.clone(),
            sub_context: self.sub_context.clone(),
            roles: self.roles.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            ordering_hint: self.ordering_hint,
            aux_values: self.aux_values.clone(),
            is_active: false,
            render_context: self.render_context.clone(),
            target: NavTarget::Placeholder,
        }
    }

    /// Relabel `child` as if it were this item, keeping the child's target.
    pub(crate) fn relabel(&self, child: &NavItem) -> Self {
        Self {
            context: self.context.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            ordering_hint: self.ordering_hint,
            sub_context: self.sub_context.clone(),
            is_active: self.is_active,
            ..child.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn route_match_is_case_insensitive() {
        let item = NavItem::action("Home", "Index", "Home");
        assert!(item.matches_route("index", "HOME"));
        assert!(!item.matches_route("About", "Home"));
    }

    #[test]
    fn url_items_never_match_route() {
        let item = NavItem::url("Docs", "/Home/Index");
        assert!(!item.matches_route("Index", "Home"));
        assert_eq!(item.kind(), NavKind::Url);
    }

    #[test]
    fn clone_does_not_share_aux_values() {
        let source = NavItem::new("Detail").with_aux_value("id", 7);
        let mut copy = source.clone();
        copy.aux_values.insert("id".to_string(), JsonValue::from(8));
        copy.is_active = true;

        assert_eq!(source.aux_values["id"], JsonValue::from(7));
        assert!(!source.is_active);
    }

    #[test]
    fn placeholder_drops_link_identity() {
        let parent = NavItem::action("Admin", "Index", "Admin")
            .with_roles("Admins")
            .with_sub_context("AdminSub")
            .with_ordering_hint(9)
            .with_aux_value("k", "v");

        let placeholder = parent.placeholder_for();
        assert_eq!(placeholder.target, NavTarget::Placeholder);
        assert_eq!(placeholder.title, "Admin");
        assert_eq!(placeholder.roles, "Admins");
        assert_eq!(placeholder.sub_context, "AdminSub");
        assert_eq!(placeholder.ordering_hint, 9);
        assert_eq!(placeholder.aux_values["k"], JsonValue::from("v"));
    }

    #[test]
    fn relabel_keeps_child_target() {
        let parent = NavItem::new("Parent")
            .with_sub_context("Sub")
            .with_ordering_hint(3);
        let child = NavItem::action("Child", "Page1", "Admin").with_roles("Users");

        let relabelled = parent.relabel(&child);
        assert_eq!(relabelled.title, "Parent");
        assert_eq!(relabelled.ordering_hint, 3);
        assert_eq!(relabelled.sub_context, "Sub");
        assert_eq!(relabelled.roles, "Users");
        assert!(relabelled.matches_route("Page1", "Admin"));
    }

    #[test]
    fn target_serializes_with_kind_tag() {
        let item = NavItem::url("Docs", "https://example.com");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["target"]["kind"], "url");
        assert_eq!(json["target"]["url"], "https://example.com");
    }
}
