//! `[watch]` section configuration.
//!
//! Without explicit rules the watcher mirrors the asset sets from `[paths]`:
//!
//! | Patterns                    | Tasks                 |
//! |-----------------------------|-----------------------|
//! | `paths.styles`              | `styles`, `modernizr` |
//! | `paths.scripts`             | `scripts`             |
//! | `paths.vendor_manifest`     | `vendor`              |
//! | `paths.templates/**/*`      | `html`                |
//! | `paths.icons`               | `icons`               |
//! | `paths.fonts`               | `fonts`               |
//!
//! ```toml
//! [watch]
//! debounce_ms = 500
//! debounce = "from-first"   # or "reset"
//! reload_debounce = "reset"  # browser reloads wait for changes to settle
//!
//! [[watch.rules]]
//! patterns = ["app/styles/**/*.scss"]
//! run = ["styles"]
//! ```

use serde::{Deserialize, Serialize};

use super::{BuildConfig, PathsConfig};
use crate::config::ConfigDiagnostics;
use crate::watch::DebounceMode;

/// Pattern set that re-runs tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRule {
    pub patterns: Vec<String>,
    pub run: Vec<String>,
}

impl WatchRule {
    fn new(patterns: Vec<String>, run: &[&str]) -> Self {
        Self {
            patterns,
            run: run.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window for every binding.
    pub debounce_ms: u64,
    pub debounce: DebounceMode,
    /// Mode for the page and stylesheet reload bindings.
    pub reload_debounce: DebounceMode,
    /// Task triggers. Defaults are derived from `[paths]`.
    pub rules: Option<Vec<WatchRule>>,
    /// Built files whose change reloads connected browsers.
    pub reload: Option<Vec<String>>,
    /// Built stylesheets, refreshed in place without a page reload.
    pub reload_css: Option<Vec<String>>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            debounce: DebounceMode::FromFirst,
            reload_debounce: DebounceMode::Reset,
            rules: None,
            reload: None,
            reload_css: None,
        }
    }
}

impl WatchConfig {
    pub fn task_rules(&self, paths: &PathsConfig) -> Vec<WatchRule> {
        if let Some(rules) = &self.rules {
            return rules.clone();
        }
        let templates = format!("{}/**/*", slashed(&paths.templates));
        vec![
            WatchRule::new(paths.styles.clone(), &["styles", "modernizr"]),
            WatchRule::new(paths.scripts.clone(), &["scripts"]),
            WatchRule::new(vec![paths.vendor_manifest.clone()], &["vendor"]),
            WatchRule::new(vec![templates], &["html"]),
            WatchRule::new(paths.icons.clone(), &["icons"]),
            WatchRule::new(paths.fonts.clone(), &["fonts"]),
        ]
    }

    pub fn reload_patterns(&self, paths: &PathsConfig, build: &BuildConfig) -> Vec<String> {
        if let Some(patterns) = &self.reload {
            return patterns.clone();
        }
        let staging = slashed(&build.staging);
        let mut patterns = vec![
            format!("{staging}/*.html"),
            format!("{staging}/scripts/**/*.js"),
            format!("{staging}/webfonts/**/*"),
        ];
        patterns.extend(paths.images.iter().cloned());
        patterns
    }

    pub fn reload_css_patterns(&self, build: &BuildConfig) -> Vec<String> {
        match &self.reload_css {
            Some(patterns) => patterns.clone(),
            None => vec![format!("{}/styles/**/*.css", slashed(&build.staging))],
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.debounce_ms == 0 {
            diag.error("watch.debounce_ms", "must be greater than 0");
        }
        for rule in self.rules.iter().flatten() {
            if rule.run.is_empty() {
                diag.error("watch.rules", format!("rule for {:?} runs no task", rule.patterns));
            }
        }
    }
}

/// Path as a glob-friendly string with `/` separators.
fn slashed(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/").trim_end_matches('/').to_string()
}
