//! Wayfinder Kernel Library
//!
//! Per-request navigation resolution: items from a runtime registry,
//! configured providers and handler declarations, filtered by the caller's
//! roles and ordered for rendering. The `wayfinder` binary serves the demo
//! handlers over HTTP.

// Lets `#[nav_controller]` expansions inside this crate use absolute paths.
extern crate self as wayfinder_kernel;

pub mod config;
pub mod demo;
pub mod error;
pub mod menu;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{Config, NavConfig};
pub use linkme;
pub use state::AppState;
pub use wayfinder_macros::nav_controller;
