//! Sample handlers served by the `wayfinder` binary.
//!
//! Each handler declares its navigation entries with `#[nav_item]`; the
//! discovery provider picks them up from the linked handler table.

use std::sync::Arc;

use wayfinder_macros::nav_controller;

use crate::menu::{NavEngine, NavItem, NavRequest};

/// Everything a demo action may touch.
pub struct ActionContext<'a> {
    pub engine: &'a NavEngine,
    pub nav: &'a NavRequest,
}

pub struct HomeController;

#[nav_controller]
impl HomeController {
    #[nav_item(
        "MainNav",
        title = "Home",
        description = "The landing page",
        ordering_hint = -1
    )]
    pub fn index(_ctx: &ActionContext<'_>) -> String {
        "Home Page - Welcome!".to_string()
    }
}

pub struct ContentController;

const EXTERNAL_LINK_TITLE: &str = "Elsewhere";

#[nav_controller]
impl ContentController {
    #[nav_item(
        "MainNav",
        sub_context = "ContentSubNav",
        title = "Site Content",
        description = "Enter here for something interesting"
    )]
    #[nav_item(
        "ContentSubNav",
        title = "Content First Page",
        description = "The same link as the parent menu",
        ordering_hint = 0
    )]
    pub fn content1(_ctx: &ActionContext<'_>) -> String {
        "Content Home".to_string()
    }

    #[nav_item(
        "ContentSubNav",
        title = "Content Second Page",
        description = "Adds an external link to the main menu",
        ordering_hint = 1
    )]
    pub fn content2(ctx: &ActionContext<'_>) -> String {
        ctx.engine.add_item_if_absent(
            "MainNav",
            Arc::new(
                NavItem::url(EXTERNAL_LINK_TITLE, "https://www.rust-lang.org")
                    .with_ordering_hint(9999),
            ),
            |i| i.title == EXTERNAL_LINK_TITLE,
        );
        "Content Page 2".to_string()
    }

    #[nav_item(
        "ContentSubNav",
        title = "Content Third Page",
        description = "Another content page",
        ordering_hint = 2
    )]
    pub fn content3(_ctx: &ActionContext<'_>) -> String {
        "Content Page 3".to_string()
    }

    #[nav_item("LeftNav", title = "Left Nav Content 1", ordering_hint = 2)]
    pub fn left1(_ctx: &ActionContext<'_>) -> String {
        "Left Nav Page 1".to_string()
    }

    #[nav_item("LeftNav", title = "Left Nav Content 2", ordering_hint = 2)]
    pub fn left2(_ctx: &ActionContext<'_>) -> String {
        "Left Nav Page 2".to_string()
    }
}

pub struct AdminController;

#[nav_controller]
#[authorize(roles = "Everyone")]
impl AdminController {
    #[nav_item(
        "MainNav",
        sub_context = "AdminSubNav",
        title = "Admin Pages",
        description = "Hidden without permissions",
        ordering_hint = 999,
        render_context = r#"{"icon": "lock"}"#
    )]
    #[nav_item(
        "AdminSubNav",
        title = "General Admin",
        description = "The admin landing page",
        ordering_hint = 0
    )]
    #[authorize(roles = "Administrators")]
    pub fn index(ctx: &ActionContext<'_>) -> String {
        ctx.engine.set_aux_value(ctx.nav, "AdminSubNav", "AdminValue", 10);
        "Admin page index".to_string()
    }

    #[nav_item("AdminSubNav", title = "Admin Page 1", ordering_hint = 1)]
    pub fn page1(ctx: &ActionContext<'_>) -> String {
        ctx.engine.set_aux_value(ctx.nav, "AdminSubNav", "AdminValue", 10);
        "Admin page 1".to_string()
    }

    #[nav_item("AdminSubNav", title = "Admin Page 2", ordering_hint = 2)]
    pub fn page2(ctx: &ActionContext<'_>) -> String {
        ctx.engine.set_aux_value(ctx.nav, "AdminSubNav", "AdminValue", 10);
        "Admin page 2".to_string()
    }
}

/// Run the demo action for a controller/action pair.
///
/// Returns None for routes no demo handler serves.
pub fn dispatch(controller: &str, action: &str, ctx: &ActionContext<'_>) -> Option<String> {
    let controller = controller.to_lowercase();
    let action = action.to_lowercase();

    let message = match (controller.as_str(), action.as_str()) {
        ("home", "index") => HomeController::index(ctx),
        ("content", "content1") => ContentController::content1(ctx),
        ("content", "content2") => ContentController::content2(ctx),
        ("content", "content3") => ContentController::content3(ctx),
        ("content", "left1") => ContentController::left1(ctx),
        ("content", "left2") => ContentController::left2(ctx),
        ("admin", "index") => AdminController::index(ctx),
        ("admin", "page1") => AdminController::page1(ctx),
        ("admin", "page2") => AdminController::page2(ctx),
        _ => return None,
    };
    Some(message)
}
