//! Project configuration loaded from `sitekit.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/   # One module per TOML section
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── util       # Config file discovery
//! └── mod.rs     # SiteConfig (this file)
//! ```
//!
//! Every field has a default, so a project without a config file builds
//! with the conventional `app/` → `.tmp/` → `dist/` layout. All relative
//! paths are resolved against the directory holding the config file.

mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{
    BuildConfig, HtmlConfig, IconsConfig, ModernizrConfig, PathsConfig, ScriptsConfig,
    ServeConfig, StylesConfig, WatchConfig, WatchRule,
};

use crate::cli::{Cli, Commands, ServeArgs};
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Root configuration structure representing `sitekit.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Config file in use, `None` when running on defaults
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory
    #[serde(skip)]
    pub root: PathBuf,

    pub paths: PathsConfig,
    pub build: BuildConfig,
    pub styles: StylesConfig,
    pub scripts: ScriptsConfig,
    pub modernizr: ModernizrConfig,
    pub html: HtmlConfig,
    pub icons: IconsConfig,
    pub serve: ServeConfig,
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from the working directory for the config file. When
    /// none is found the working directory becomes the root and defaults
    /// apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let mut config = Self::load_from(find_config_file(&cli.config), &cwd)?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional config file, falling back to `default_root`.
    fn load_from(path: Option<PathBuf>, default_root: &Path) -> Result<Self> {
        let Some(path) = path else {
            debug!("config"; "no config file found, using defaults");
            return Ok(Self::default().with_root(default_root));
        };

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_root.to_path_buf());
        let mut config = Self::from_path(&path)?.with_root(&root);
        config.config_path = Some(path);
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load a config file, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("in {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    pub fn with_root(mut self, root: &Path) -> Self {
        self.root = root.to_path_buf();
        self
    }

    // ========================================================================
    // paths
    // ========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the project root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Path relative to the project root, for display.
    pub fn root_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root_join(&self.build.staging)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root_join(&self.build.dist)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root_join(&self.build.cache)
    }

    pub fn sprite_path(&self) -> PathBuf {
        self.root_join(&self.build.sprite)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root_join(&self.paths.templates)
    }

    // ========================================================================
    // cli overrides
    // ========================================================================

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(Commands::Serve { serve } | Commands::Watch { serve }) = &cli.command {
            self.apply_serve_args(serve);
        }
    }

    fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(interface) = args.interface {
            self.serve.interface = interface;
        }
        if let Some(port) = args.port {
            self.serve.port = port;
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&mut diag);
        self.build.validate(&mut diag);
        self.styles.validate(&mut diag);
        self.scripts.validate(&mut diag);
        self.modernizr.validate(&mut diag);
        self.icons.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.watch.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config text, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
