//! `[html]` and `[icons]` section configuration.
//!
//! ```toml
//! [html]
//! context = { title = "My site" }
//!
//! [icons]
//! prefix = "icon-"
//! whitespace = "_"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Template rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Variables available to every page template.
    pub context: toml::Table,
}

/// Icon sprite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsConfig {
    /// Prepended to every symbol id.
    pub prefix: String,
    /// Replacement for whitespace in file names.
    pub whitespace: String,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            prefix: "icon-".into(),
            whitespace: "_".into(),
        }
    }
}

impl IconsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.whitespace.chars().any(char::is_whitespace) {
            diag.error("icons.whitespace", "replacement must not contain whitespace");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_html_context() {
        let config = test_parse_config("[html.context]\ntitle = \"Starter\"\nyear = 2016");
        assert_eq!(
            config.html.context.get("title").and_then(|v| v.as_str()),
            Some("Starter")
        );
    }

    #[test]
    fn test_icons_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.icons.prefix, "icon-");
        assert_eq!(config.icons.whitespace, "_");
    }
}
