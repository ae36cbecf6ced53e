//! The site's task graph.
//!
//! ```text
//! build ─┬─ html ── icons
//!        ├─ fonts
//!        ├─ images
//!        ├─ styles
//!        ├─ vendor
//!        ├─ scripts ── lint
//!        └─ modernizr
//!   body: minify
//! ```
//!
//! `serve` and `watch` are orchestrations over this graph and live in the
//! CLI layer.

mod clean;
mod steps;


pub use clean::clean;

use crate::config::SiteConfig;
use crate::task::{GraphError, TaskGraph, TaskGraphBuilder};

/// Tasks run before `serve` starts watching.
pub const SERVE_PREREQUISITES: &[&str] = &["html", "styles", "vendor", "scripts", "modernizr"];

/// Prerequisites of `build`, in registration order.
pub const BUILD_PREREQUISITES: &[&str] =
    &["html", "fonts", "images", "styles", "vendor", "scripts", "modernizr"];

pub fn task_graph() -> Result<TaskGraph<SiteConfig>, GraphError> {
    TaskGraphBuilder::new()
        .task("styles", &[], steps::styles)
        .task("lint", &[], steps::lint)
        .task("scripts", &["lint"], steps::scripts)
        .task("vendor", &[], steps::vendor)
        .task("modernizr", &[], steps::modernizr)
        .task("images", &[], steps::images)
        .task("icons", &[], steps::icons)
        .task("html", &["icons"], steps::html)
        .task("fonts", &[], steps::fonts)
        .task("minify", &[], steps::minify)
        .task("clean", &[], clean)
        .task("build", BUILD_PREREQUISITES, steps::minify)
        .build()
}
