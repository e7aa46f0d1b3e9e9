//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::menu::{HandlerCatalog, NavEngine, NavRegistry};
use crate::metrics::NavMetrics;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Navigation engine shared by every request.
    engine: Arc<NavEngine>,

    /// Handlers linked into this binary.
    catalog: Arc<HandlerCatalog>,

    /// Contexts rendered on every page.
    nav_contexts: Vec<String>,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let nav_config = config
            .load_nav_config()
            .context("failed to load navigation configuration")?;

        let metrics = Arc::new(NavMetrics::new());
        let engine = nav_config
            .build_engine(Arc::new(NavRegistry::new()), metrics)
            .context("failed to build navigation engine")?;

        let catalog = HandlerCatalog::linked();
        info!(handlers = catalog.len(), "handler catalog linked");

        Ok(Self::from_parts(
            engine,
            catalog,
            config.nav_contexts.clone(),
        ))
    }

    /// Assemble state from already-built parts.
    ///
    /// The rendered contexts and every context the catalog declares are
    /// registered as metric labels.
    pub fn from_parts(engine: NavEngine, catalog: HandlerCatalog, nav_contexts: Vec<String>) -> Self {
        let metrics = engine.metrics();
        metrics.register_contexts(&nav_contexts);
        metrics.register_contexts(catalog.declared_contexts());

        Self {
            inner: Arc::new(AppStateInner {
                engine: Arc::new(engine),
                catalog: Arc::new(catalog),
                nav_contexts,
            }),
        }
    }

    pub fn engine(&self) -> &Arc<NavEngine> {
        &self.inner.engine
    }

    pub fn catalog(&self) -> &Arc<HandlerCatalog> {
        &self.inner.catalog
    }

    pub fn metrics(&self) -> &Arc<NavMetrics> {
        self.inner.engine.metrics()
    }

    pub fn nav_contexts(&self) -> &[String] {
        &self.inner.nav_contexts
    }
}
