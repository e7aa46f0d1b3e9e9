//! Configuration loaded from environment variables and the navigation TOML file.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::menu::{
    DiscoveryProvider, InactiveNavBehavior, NavEngine, NavError, NavItem, NavRegistry, NavResult,
    StaticProvider,
};
use crate::metrics::NavMetrics;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to the navigation TOML file. When None, only handler discovery is used.
    pub nav_config: Option<PathBuf>,

    /// Contexts rendered on every demo page (comma-separated, default: "MainNav").
    pub nav_contexts: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let nav_config = env::var("NAV_CONFIG").ok().map(PathBuf::from);

        let nav_contexts = env::var("NAV_CONTEXTS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|_| vec!["MainNav".to_string()]);

        Ok(Self {
            port,
            nav_config,
            nav_contexts,
        })
    }

    /// Load the navigation file named by `NAV_CONFIG`, or the discovery-only default.
    pub fn load_nav_config(&self) -> Result<NavConfig> {
        match &self.nav_config {
            Some(path) => NavConfig::load(path),
            None => Ok(NavConfig::discovery_only()),
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Provider list and inactive-branch behavior.
///
/// ```toml
/// inactive_nav_behavior = "show_if_active_child"
///
/// [[providers]]
/// name = "handlers"
/// type = "discovery"
///
/// [[providers]]
/// name = "links"
/// type = "static"
/// [[providers.items]]
/// context = "MainNav"
/// title = "Docs"
/// url = "https://example.com/docs"
/// ordering_hint = 100
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub inactive_nav_behavior: InactiveNavBehavior,

    /// Providers, consulted in this order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// One configured provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,

    /// Provider type: "discovery" (alias "reflection") or "static".
    #[serde(rename = "type")]
    pub kind: String,

    /// Items served by a "static" provider.
    #[serde(default)]
    pub items: Vec<StaticItemConfig>,
}

/// A navigation item declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticItemConfig {
    pub context: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub sub_context: String,
    #[serde(default)]
    pub ordering_hint: i32,
    pub url: Option<String>,
    pub action: Option<String>,
    pub controller: Option<String>,
    pub render_context: Option<serde_json::Value>,
}

impl StaticItemConfig {
    fn to_item(&self) -> NavResult<NavItem> {
        let base = match (&self.url, &self.action, &self.controller) {
            (Some(url), None, None) => NavItem::url(&self.title, url),
            (None, Some(action), Some(controller)) => {
                NavItem::action(&self.title, action, controller)
            }
            (None, None, None) => NavItem::new(&self.title),
            _ => {
                return Err(NavError::configuration(format!(
                    "item '{}' in context '{}' must set either url or both action and controller",
                    self.title, self.context
                )));
            }
        };

        let mut item = base
            .with_description(&self.description)
            .with_roles(&self.roles)
            .with_sub_context(&self.sub_context)
            .with_ordering_hint(self.ordering_hint);
        item.render_context = self.render_context.clone();
        Ok(item)
    }
}

impl NavConfig {
    /// Read and parse a navigation TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read navigation config {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("failed to parse navigation config {}", path.display()))?;
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// A single discovery provider and the default behavior.
    pub fn discovery_only() -> Self {
        Self {
            inactive_nav_behavior: InactiveNavBehavior::default(),
            providers: vec![ProviderConfig {
                name: "handlers".to_string(),
                kind: "discovery".to_string(),
                items: Vec::new(),
            }],
        }
    }

    /// Wire the configured providers, in order, into an engine.
    pub fn build_engine(
        &self,
        registry: Arc<NavRegistry>,
        metrics: Arc<NavMetrics>,
    ) -> NavResult<NavEngine> {
        let mut builder = NavEngine::builder()
            .registry(registry)
            .metrics(Arc::clone(&metrics))
            .inactive_behavior(self.inactive_nav_behavior);

        let mut names = HashSet::new();
        for provider in &self.providers {
            if !names.insert(provider.name.as_str()) {
                return Err(NavError::configuration(format!(
                    "duplicate nav provider name '{}'",
                    provider.name
                )));
            }

            builder = match provider.kind.to_lowercase().as_str() {
                "discovery" | "reflection" => {
                    builder.provider(DiscoveryProvider::new(&provider.name))
                }
                "static" => {
                    let mut fixed = StaticProvider::new(&provider.name);
                    for item in &provider.items {
                        fixed = fixed.with_item(&item.context, item.to_item()?);
                        metrics.register_contexts([&item.context, &item.sub_context]);
                    }
                    builder.provider(fixed)
                }
                other => {
                    return Err(NavError::configuration(format!(
                        "nav provider '{}' has unknown type '{other}'",
                        provider.name
                    )));
                }
            };
        }

        info!(
            providers = self.providers.len(),
            behavior = ?self.inactive_nav_behavior,
            "navigation engine configured"
        );

        Ok(builder.build())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::menu::{NavKind, NavRequest};

    const SAMPLE: &str = r#"
inactive_nav_behavior = "RedirectToFirstActive"

[[providers]]
name = "handlers"
type = "discovery"

[[providers]]
name = "links"
type = "static"

[[providers.items]]
context = "MainNav"
title = "Docs"
url = "https://example.com/docs"
ordering_hint = 100

[[providers.items]]
context = "MainNav"
title = "Reports"
action = "Index"
controller = "Reports"
roles = "Analysts"
render_context = { icon = "chart" }
"#;

    #[test]
    fn parses_providers_in_order() {
        let config = NavConfig::parse(SAMPLE).unwrap();
        assert_eq!(
            config.inactive_nav_behavior,
            InactiveNavBehavior::RedirectToFirstActive
        );
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].kind, "discovery");
        assert_eq!(config.providers[1].items.len(), 2);
        assert_eq!(
            config.providers[1].items[1].render_context.as_ref().unwrap()["icon"],
            "chart"
        );
    }

    #[test]
    fn missing_behavior_defaults_to_always_hide() {
        let config = NavConfig::parse("").unwrap();
        assert_eq!(config.inactive_nav_behavior, InactiveNavBehavior::AlwaysHide);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn builds_engine_from_config() {
        let mut config = NavConfig::parse(SAMPLE).unwrap();
        config.providers.remove(0);
        let engine = config
            .build_engine(Arc::new(NavRegistry::new()), Arc::new(NavMetrics::new()))
            .unwrap();
        assert_eq!(engine.provider_names(), vec!["links"]);
        assert_eq!(engine.behavior(), InactiveNavBehavior::RedirectToFirstActive);

        let request = NavRequest::new("Home", "Index").with_user_roles(["Analysts"]);
        let items = engine.resolve(&request, "MainNav").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Reports");
        assert_eq!(items[1].kind(), NavKind::Url);
    }

    #[test]
    fn static_item_contexts_are_labeled_in_metrics() {
        let mut config = NavConfig::parse(SAMPLE).unwrap();
        config.providers.remove(0);
        let metrics = Arc::new(NavMetrics::new());
        let engine = config
            .build_engine(Arc::new(NavRegistry::new()), Arc::clone(&metrics))
            .unwrap();

        let request = NavRequest::new("Home", "Index").with_user_roles(["Analysts"]);
        engine.resolve(&request, "MainNav").unwrap();
        engine.resolve(&request, "Unlisted").unwrap();

        let output = metrics.encode();
        assert!(output.contains("nav_resolutions_total{context=\"MainNav\"} 1"));
        assert!(output.contains("nav_resolutions_total{context=\"other\"} 1"));
    }

    #[test]
    fn unknown_provider_type_is_configuration_error() {
        let config = NavConfig::parse(
            r#"
[[providers]]
name = "odd"
type = "database"
"#,
        )
        .unwrap();
        let err = config
            .build_engine(Arc::new(NavRegistry::new()), Arc::new(NavMetrics::new()))
            .unwrap_err();
        assert!(matches!(err, NavError::Configuration(_)));
    }

    #[test]
    fn duplicate_provider_names_rejected() {
        let config = NavConfig::parse(
            r#"
[[providers]]
name = "a"
type = "static"

[[providers]]
name = "a"
type = "discovery"
"#,
        )
        .unwrap();
        assert!(
            config
                .build_engine(Arc::new(NavRegistry::new()), Arc::new(NavMetrics::new()))
                .is_err()
        );
    }

    #[test]
    fn item_with_url_and_action_rejected() {
        let config = NavConfig::parse(
            r#"
[[providers]]
name = "links"
type = "static"

[[providers.items]]
context = "MainNav"
title = "Confused"
url = "/x"
action = "Index"
controller = "Home"
"#,
        )
        .unwrap();
        assert!(
            config
                .build_engine(Arc::new(NavRegistry::new()), Arc::new(NavMetrics::new()))
                .is_err()
        );
    }

    #[test]
    fn parse_list_skips_blanks() {
        assert_eq!(parse_list("MainNav, LeftNav,,"), vec!["MainNav", "LeftNav"]);
    }
}
