//! Navigation registry - holds items added imperatively at runtime.
//!
//! Items are stored per context as shared handles so callers can remove the
//! exact item they added. The engine never hands these handles out; it
//! clones each item before resolution touches it.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::item::NavItem;

/// Registry of imperatively added navigation items.
///
/// Safe to share between concurrently served requests.
#[derive(Debug, Default)]
pub struct NavRegistry {
    /// Items per context, in insertion order.
    items: DashMap<String, Vec<Arc<NavItem>>>,
}

impl NavRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to a context.
    ///
    /// The same item may be added more than once.
    pub fn add_item(&self, context: &str, item: Arc<NavItem>) {
        debug!(context = %context, title = %item.title, "registering nav item");
        self.items.entry(context.to_string()).or_default().push(item);
    }

    /// Append an item unless the context already holds one matching `exists`.
    ///
    /// The check and the append happen under the same bucket lock, so
    /// concurrent callers register at most one matching item. Returns true
    /// if the item was added.
    pub fn add_item_if_absent<F>(&self, context: &str, item: Arc<NavItem>, exists: F) -> bool
    where
        F: Fn(&NavItem) -> bool,
    {
        let mut bucket = self.items.entry(context.to_string()).or_default();
        if bucket.iter().any(|i| exists(i.as_ref())) {
            return false;
        }
        debug!(context = %context, title = %item.title, "registering nav item");
        bucket.push(item);
        true
    }

    /// Remove the first occurrence of `item` (by identity) from a context.
    ///
    /// Returns false if the context is unknown or the item was not found.
    pub fn remove_item(&self, context: &str, item: &Arc<NavItem>) -> bool {
        let Some(mut bucket) = self.items.get_mut(context) else {
            return false;
        };

        match bucket.iter().position(|i| Arc::ptr_eq(i, item)) {
            Some(index) => {
                bucket.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every item registered for a context.
    pub fn remove_context(&self, context: &str) -> bool {
        self.items.remove(context).is_some()
    }

    /// Snapshot of a context's items, in insertion order.
    pub fn items(&self, context: &str) -> Vec<Arc<NavItem>> {
        self.items
            .get(context)
            .map(|bucket| bucket.clone())
            .unwrap_or_default()
    }

    /// Number of contexts with a bucket.
    pub fn context_count(&self) -> usize {
        self.items.len()
    }

    /// Check if no context has a bucket.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_duplicates_in_order() {
        let registry = NavRegistry::new();
        let a = Arc::new(NavItem::new("A"));
        let b = Arc::new(NavItem::new("B"));

        registry.add_item("Main", Arc::clone(&a));
        registry.add_item("Main", Arc::clone(&b));
        registry.add_item("Main", Arc::clone(&a));

        let titles: Vec<_> = registry
            .items("Main")
            .iter()
            .map(|i| i.title.clone())
            .collect();
        assert_eq!(titles, vec!["A", "B", "A"]);
    }

    #[test]
    fn add_if_absent_skips_matching_item() {
        let registry = NavRegistry::new();
        let same_title = |i: &NavItem| i.title == "Link";

        assert!(registry.add_item_if_absent("Main", Arc::new(NavItem::new("Link")), same_title));
        assert!(!registry.add_item_if_absent("Main", Arc::new(NavItem::new("Link")), same_title));
        assert!(registry.add_item_if_absent(
            "Other",
            Arc::new(NavItem::new("Link")),
            same_title
        ));

        assert_eq!(registry.items("Main").len(), 1);
        assert_eq!(registry.items("Other").len(), 1);
    }

    #[test]
    fn add_if_absent_is_atomic_across_threads() {
        let registry = Arc::new(NavRegistry::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.add_item_if_absent("Main", Arc::new(NavItem::new("Link")), |i| {
                        i.title == "Link"
                    })
                })
            })
            .collect();
        let added = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|added| *added)
            .count();

        assert_eq!(added, 1);
        assert_eq!(registry.items("Main").len(), 1);
    }

    #[test]
    fn remove_item_matches_identity_not_value() {
        let registry = NavRegistry::new();
        let first = Arc::new(NavItem::new("Same"));
        let second = Arc::new(NavItem::new("Same"));

        registry.add_item("Main", Arc::clone(&first));
        registry.add_item("Main", Arc::clone(&second));

        assert!(registry.remove_item("Main", &second));
        let remaining = registry.items("Main");
        assert_eq!(remaining.len(), 1);
        assert!(Arc::ptr_eq(&remaining[0], &first));

        assert!(!registry.remove_item("Main", &second));
    }

    #[test]
    fn remove_from_unknown_context_is_false() {
        let registry = NavRegistry::new();
        let item = Arc::new(NavItem::new("A"));
        assert!(!registry.remove_item("Nowhere", &item));
        assert!(!registry.remove_context("Nowhere"));
    }

    #[test]
    fn remove_context_drops_bucket() {
        let registry = NavRegistry::new();
        registry.add_item("Main", Arc::new(NavItem::new("A")));
        assert_eq!(registry.context_count(), 1);

        assert!(registry.remove_context("Main"));
        assert!(registry.items("Main").is_empty());
        assert!(registry.is_empty());
    }
}
