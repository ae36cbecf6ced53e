//! `[build]` section configuration.
//!
//! Output locations. All paths are relative to the project root.
//!
//! ```toml
//! [build]
//! staging = ".tmp"
//! dist = "dist"
//! cache = ".sitekit-cache"
//! sprite = "app/templates/partials/iconsprite.svg"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Development output, served first by the dev server.
    pub staging: PathBuf,
    /// Minified distribution output.
    pub dist: PathBuf,
    /// Optimized image cache, survives `clean`.
    pub cache: PathBuf,
    /// Generated icon sprite, included by templates.
    pub sprite: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            staging: PathBuf::from(".tmp"),
            dist: PathBuf::from("dist"),
            cache: PathBuf::from(".sitekit-cache"),
            sprite: PathBuf::from("app/templates/partials/iconsprite.svg"),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.staging.as_os_str().is_empty() {
            diag.error("build.staging", "must not be empty");
        }
        if self.dist.as_os_str().is_empty() {
            diag.error("build.dist", "must not be empty");
        }
        if self.staging == self.dist {
            diag.error_with_hint(
                "build.dist",
                "staging and dist directories are the same",
                "minify reads staging and writes dist",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.staging.to_str(), Some(".tmp"));
        assert_eq!(config.build.dist.to_str(), Some("dist"));
    }

    #[test]
    fn test_same_staging_and_dist_rejected() {
        let config = test_parse_config("[build]\nstaging = \"out\"\ndist = \"out\"");
        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        assert!(!diag.is_empty());
    }
}
