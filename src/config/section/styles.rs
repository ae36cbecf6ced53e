//! `[styles]` section configuration.
//!
//! ```toml
//! [styles]
//! compiler = ["sass"]
//! output_style = "expanded"
//! include_paths = ["node_modules/susy/sass"]
//! browsers = ["last 3 versions", "> 5%", "IE >= 9"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Sass compiler command. Extra elements are passed as arguments.
    pub compiler: Vec<String>,
    /// `expanded` or `compressed`.
    pub output_style: String,
    /// Extra load paths, relative to the project root.
    pub include_paths: Vec<PathBuf>,
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            compiler: vec!["sass".into()],
            output_style: "expanded".into(),
            include_paths: vec![
                PathBuf::from("node_modules/susy/sass"),
                PathBuf::from("bower_components/scut/dist"),
                PathBuf::from("bower_components/megatype"),
            ],
            browsers: vec!["last 3 versions".into(), "> 5%".into(), "IE >= 9".into()],
        }
    }
}

impl StylesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.compiler.is_empty() {
            diag.error("styles.compiler", "must name a command");
        }
        if !matches!(self.output_style.as_str(), "expanded" | "compressed") {
            diag.error_with_hint(
                "styles.output_style",
                format!("unknown style `{}`", self.output_style),
                "use `expanded` or `compressed`",
            );
        }
        if let Err(e) = lightningcss::targets::Browsers::from_browserslist(&self.browsers) {
            diag.error("styles.browsers", format!("invalid query: {e}"));
        }
    }
}
