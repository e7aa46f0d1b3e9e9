//! Navigation system: item model, sources and the resolution engine.
//!
//! Items come from three places:
//! - The [`NavRegistry`], for items added imperatively at runtime
//! - [`NavProvider`] implementations, consulted in registration order
//! - The [`DiscoveryProvider`], which reads `#[nav_item]` declarations on handlers
//!
//! [`NavEngine::resolve`] combines them for one request.

mod discovery;
mod engine;
mod error;
mod item;
mod provider;
mod registry;
mod request;
mod roles;

pub use discovery::{
    ActionDescriptor, DiscoveryProvider, HandlerCatalog, HandlerDescriptor, NAV_HANDLERS,
    NavDeclaration, controller_name, scan_catalog,
};
pub use engine::{InactiveNavBehavior, NavEngine, NavEngineBuilder};
pub use error::{NavError, NavResult};
pub use item::{ActionOrigin, ActionTarget, AuxValues, NavItem, NavKind, NavTarget};
pub use provider::{NavProvider, StaticProvider};
pub use registry::NavRegistry;
pub use request::{ContextValues, NavRequest, RouteInfo};
pub use roles::{RequestRoles, RoleSet, RoleSource, split_roles};
