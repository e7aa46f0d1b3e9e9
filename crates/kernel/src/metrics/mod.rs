//! Prometheus metrics collection.
//!
//! Counts navigation resolutions and the degraded paths the engine takes
//! silently (fail-open role lookups, truncated sub-context cycles).
//!
//! Context names can come from request paths, so only contexts registered
//! up front get their own label; everything else is counted under
//! [`OTHER_CONTEXT`].

use std::collections::HashSet;

use parking_lot::RwLock;

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Label for resolutions of contexts not registered with [`NavMetrics::register_contexts`].
pub const OTHER_CONTEXT: &str = "other";

/// Navigation context labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ContextLabels {
    pub context: String,
}

/// Navigation metrics.
pub struct NavMetrics {
    registry: Registry,

    /// Contexts labeled by name.
    known_contexts: RwLock<HashSet<String>>,

    /// Resolutions by root context.
    pub resolutions: Family<ContextLabels, Counter>,

    /// Resolution duration.
    pub resolve_duration_seconds: Histogram,

    /// Role lookups that failed and fell back to no filtering.
    pub role_lookup_failures: Counter,

    /// Sub-context expansions cut short by the cycle guard.
    pub cycle_truncations: Counter,

    /// Disallowed top-level items dropped from a result.
    pub hidden_items: Counter,
}

impl NavMetrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let resolutions = Family::<ContextLabels, Counter>::default();
        registry.register(
            "nav_resolutions",
            "Navigation resolutions by context",
            resolutions.clone(),
        );

        let resolve_duration_seconds = Histogram::new(exponential_buckets(0.00001, 2.0, 14));
        registry.register(
            "nav_resolve_duration_seconds",
            "Navigation resolution duration in seconds",
            resolve_duration_seconds.clone(),
        );

        let role_lookup_failures = Counter::default();
        registry.register(
            "nav_role_lookup_failures",
            "Role lookups that failed open",
            role_lookup_failures.clone(),
        );

        let cycle_truncations = Counter::default();
        registry.register(
            "nav_cycle_truncations",
            "Sub-context expansions truncated by the cycle guard",
            cycle_truncations.clone(),
        );

        let hidden_items = Counter::default();
        registry.register(
            "nav_hidden_items",
            "Disallowed navigation items dropped from results",
            hidden_items.clone(),
        );

        Self {
            registry,
            known_contexts: RwLock::new(HashSet::new()),
            resolutions,
            resolve_duration_seconds,
            role_lookup_failures,
            cycle_truncations,
            hidden_items,
        }
    }

    /// Allow these contexts to be labeled by name.
    pub fn register_contexts<I, S>(&self, contexts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known = self.known_contexts.write();
        for context in contexts {
            let context = context.as_ref().trim();
            if !context.is_empty() {
                known.insert(context.to_string());
            }
        }
    }

    /// Record a completed resolution.
    pub fn record_resolution(&self, context: &str, duration_secs: f64) {
        let labels = ContextLabels {
            context: self.context_label(context),
        };
        self.resolutions.get_or_create(&labels).inc();
        self.resolve_duration_seconds.observe(duration_secs);
    }

    fn context_label(&self, context: &str) -> String {
        if self.known_contexts.read().contains(context) {
            context.to_string()
        } else {
            OTHER_CONTEXT.to_string()
        }
    }

    pub fn record_role_lookup_failure(&self) {
        self.role_lookup_failures.inc();
    }

    pub fn record_cycle_truncation(&self) {
        self.cycle_truncations.inc();
    }

    pub fn record_hidden(&self, count: u64) {
        self.hidden_items.inc_by(count);
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails,
    /// which the infallible `fmt::Write` impl for `String` rules out.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for NavMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NavMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavMetrics").finish()
    }
}
