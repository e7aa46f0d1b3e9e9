#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Handler discovery tests.
//!
//! Handlers declared here with `#[nav_controller]` are linked alongside the
//! kernel's demo handlers, so the linked catalog contains both.

use std::sync::Arc;

use wayfinder_kernel::menu::{
    ActionOrigin, DiscoveryProvider, HandlerCatalog, NavEngine, NavError, NavProvider, NavRequest,
};
use wayfinder_kernel::nav_controller;
use wayfinder_test_utils::{assert, request_as};

pub struct ReportsController;

#[nav_controller]
#[authorize(roles = "Analysts")]
impl ReportsController {
    #[nav_item(
        "ReportsNav",
        title = "Summary",
        description = "Monthly summary",
        ordering_hint = 5
    )]
    #[nav_item("Dashboard", title = "Reports", sub_context = "ReportsNav")]
    pub fn summary() -> &'static str {
        "summary"
    }

    #[nav_item(
        "ReportsNav",
        title = "Export",
        ordering_hint = 1,
        render_context = r#"{"format": "csv"}"#
    )]
    #[authorize(roles = "Exporters;analysts")]
    pub fn export() -> &'static str {
        "export"
    }

    pub fn refresh() -> &'static str {
        "refresh"
    }
}

fn discovery_request(controller: &str, action: &str, roles: &[&str]) -> NavRequest {
    request_as(controller, action, roles).with_catalog(Arc::new(HandlerCatalog::linked()))
}

#[test]
fn decorated_methods_keep_working() {
    assert_eq!(ReportsController::summary(), "summary");
    assert_eq!(ReportsController::refresh(), "refresh");
}

#[test]
fn linked_catalog_includes_declared_handlers() {
    let catalog = HandlerCatalog::linked();
    let names: Vec<&str> = catalog.handlers().iter().map(|h| h.type_name).collect();

    assert!(names.contains(&"ReportsController"));
    assert!(names.contains(&"AdminController"));
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    let (handler, action) = catalog.find_action("reports", "EXPORT").unwrap();
    assert_eq!(handler.controller_name(), "Reports");
    assert_eq!(action.name, "export");
    assert_eq!(action.nav.len(), 1);
    assert!(catalog.find_action("reports", "refresh").unwrap().1.nav.is_empty());
}

#[test]
fn discovered_items_carry_route_and_roles() {
    let provider = DiscoveryProvider::default();
    let request = discovery_request("Reports", "Summary", &["Analysts"]);

    let items = provider.list_items(&request, "ReportsNav").unwrap();
    assert_eq!(items.len(), 2);

    let summary = items.iter().find(|i| i.title == "Summary").unwrap();
    assert_eq!(summary.roles, "Analysts");
    assert_eq!(summary.ordering_hint, 5);
    assert_eq!(summary.description, "Monthly summary");
    let target = summary.action_target().unwrap();
    assert_eq!(target.controller, "Reports");
    assert_eq!(target.action, "summary");
    assert_eq!(target.origin, ActionOrigin::Discovered);

    let export = items.iter().find(|i| i.title == "Export").unwrap();
    assert_eq!(export.roles, "Exporters analysts");
    assert_eq!(export.render_context.as_ref().unwrap()["format"], "csv");
}

#[test]
fn scan_is_cached_after_first_use() {
    let provider = DiscoveryProvider::new("handlers");
    assert!(!provider.is_scanned());

    provider
        .list_items(&discovery_request("Home", "Index", &[]), "Dashboard")
        .unwrap();
    assert!(provider.is_scanned());

    // Later calls no longer need a catalog.
    let bare = NavRequest::new("Home", "Index");
    let items = provider.list_items(&bare, "Dashboard").unwrap();
    assert_eq!(items.len(), 1);
    assert!(provider.list_items(&bare, "NoSuchNav").unwrap().is_empty());
}

#[test]
fn first_use_without_catalog_is_configuration_error() {
    let engine = NavEngine::builder()
        .provider(DiscoveryProvider::new("handlers"))
        .build();

    let err = engine
        .resolve(&NavRequest::new("Home", "Index"), "Dashboard")
        .unwrap_err();
    match err {
        NavError::Provider { provider, source } => {
            assert_eq!(provider, "handlers");
            assert!(matches!(*source, NavError::Configuration(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn engine_resolves_discovered_tree() {
    let engine = NavEngine::builder()
        .provider(DiscoveryProvider::default())
        .build();

    let analyst = discovery_request("reports", "export", &["Analysts"]);
    let dashboard = engine.resolve(&analyst, "Dashboard").unwrap();
    assert::titles_eq(&dashboard, &["Reports"]);
    assert::active(&dashboard, "Reports");

    let sub = engine.resolve(&analyst, "ReportsNav").unwrap();
    assert::titles_eq(&sub, &["Summary"]);

    let exporter = discovery_request("reports", "export", &["Analysts", "Exporters"]);
    let sub = engine.resolve(&exporter, "ReportsNav").unwrap();
    assert::titles_eq(&sub, &["Export", "Summary"]);

    let guest = discovery_request("Home", "Index", &["Guests"]);
    assert!(engine.resolve(&guest, "Dashboard").unwrap().is_empty());
}
