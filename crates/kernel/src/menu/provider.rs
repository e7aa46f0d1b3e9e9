//! Nav provider trait and the static provider.
//!
//! Providers contribute items for a context on every resolution. The engine
//! calls them in registration order and clones whatever they return.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::NavResult;
use super::item::NavItem;
use super::request::NavRequest;

/// A source of navigation items.
pub trait NavProvider: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// List the items this provider contributes to `context`.
    ///
    /// Unknown contexts yield an empty list.
    fn list_items(&self, request: &NavRequest, context: &str) -> NavResult<Vec<Arc<NavItem>>>;
}

/// Provider over a fixed set of items, grouped by context.
#[derive(Debug, Default)]
pub struct StaticProvider {
    name: String,
    items: HashMap<String, Vec<Arc<NavItem>>>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: HashMap::new(),
        }
    }

    /// Add an item to a context, after any already present.
    pub fn with_item(mut self, context: impl Into<String>, item: NavItem) -> Self {
        self.items
            .entry(context.into())
            .or_default()
            .push(Arc::new(item));
        self
    }

    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NavProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_items(&self, _request: &NavRequest, context: &str) -> NavResult<Vec<Arc<NavItem>>> {
        Ok(self.items.get(context).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_groups_by_context() {
        let provider = StaticProvider::new("links")
            .with_item("MainNav", NavItem::url("Docs", "/docs"))
            .with_item("MainNav", NavItem::url("Blog", "/blog"))
            .with_item("Footer", NavItem::url("Legal", "/legal"));

        let request = NavRequest::new("Home", "Index");
        let main = provider.list_items(&request, "MainNav").unwrap();
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].title, "Docs");
        assert_eq!(provider.len(), 3);
        assert!(provider.list_items(&request, "Nope").unwrap().is_empty());
    }
}
