//! `[paths]` section configuration.
//!
//! Source glob pattern sets, one per asset kind. Patterns are relative to
//! the project root; `*` stays inside one directory, `**` crosses them.
//!
//! ```toml
//! [paths]
//! styles = ["app/styles/**/*.scss"]
//! scripts = ["app/scripts/**/*.js"]
//! vendor = ["bower_components/jquery/dist/jquery.js"]
//! vendor_manifest = "bower.json"
//! html = ["app/templates/pages/**/*.{html,nunjucks}"]
//! templates = "app/templates"
//! images = ["app/images/**/*.{svg,gif,png,jpg}"]
//! fonts = ["app/webfonts/**/*"]
//! icons = ["app/images/icons/**/*.svg"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
    /// Third-party scripts, concatenated in the listed order.
    pub vendor: Vec<String>,
    /// Dependency manifest whose changes rebuild the vendor bundle.
    pub vendor_manifest: String,
    /// Pages to render. Output paths are relative to the pattern base.
    pub html: Vec<String>,
    /// Template search root for includes and layouts.
    pub templates: PathBuf,
    pub images: Vec<String>,
    pub fonts: Vec<String>,
    pub icons: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            styles: vec!["app/styles/**/*.scss".into()],
            scripts: vec!["app/scripts/**/*.js".into()],
            vendor: vec!["bower_components/jquery/dist/jquery.js".into()],
            vendor_manifest: "bower.json".into(),
            html: vec!["app/templates/pages/**/*.{html,nunjucks}".into()],
            templates: PathBuf::from("app/templates"),
            images: vec!["app/images/**/*.{svg,gif,png,jpg}".into()],
            fonts: vec!["app/webfonts/**/*".into()],
            icons: vec!["app/images/icons/**/*.svg".into()],
        }
    }
}

impl PathsConfig {
    /// Every named pattern set, for validation and listing.
    pub fn sets(&self) -> [(&'static str, &[String]); 7] {
        [
            ("styles", self.styles.as_slice()),
            ("scripts", self.scripts.as_slice()),
            ("vendor", self.vendor.as_slice()),
            ("html", self.html.as_slice()),
            ("images", self.images.as_slice()),
            ("fonts", self.fonts.as_slice()),
            ("icons", self.icons.as_slice()),
        ]
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, patterns) in self.sets() {
            for pattern in patterns {
                let raw = pattern.strip_prefix('!').unwrap_or(pattern);
                if let Err(e) = globset::Glob::new(raw) {
                    diag.error(format!("paths.{name}"), format!("invalid glob `{pattern}`: {e}"));
                }
                if raw.starts_with('/') {
                    diag.error_with_hint(
                        format!("paths.{name}"),
                        format!("`{pattern}` is absolute"),
                        "patterns are resolved against the project root",
                    );
                }
            }
        }
    }
}
