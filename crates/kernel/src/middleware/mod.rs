//! HTTP middleware components.
//!
//! Provides the per-request navigation state layer.

pub mod nav_request;

pub use nav_request::{ROLES_HEADER, attach_nav_request, caller_roles, route_from_path};
