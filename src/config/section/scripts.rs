//! `[scripts]` and `[modernizr]` section configuration.
//!
//! ```toml
//! [scripts]
//! bundle = "main.js"
//! vendor_bundle = "vendor.js"
//! lint_strict = false
//!
//! [modernizr]
//! output = "modernizr.js"
//! options = ["setClasses", "addTest", "html5printshiv", "testProp"]
//! tests = []
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// File name of the concatenated site scripts.
    pub bundle: String,
    /// File name of the concatenated vendor scripts.
    pub vendor_bundle: String,
    /// Fail `lint` (and so `scripts`) on any diagnostic.
    pub lint_strict: bool,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            bundle: "main.js".into(),
            vendor_bundle: "vendor.js".into(),
            lint_strict: false,
        }
    }
}

impl ScriptsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, name) in [("scripts.bundle", &self.bundle), ("scripts.vendor_bundle", &self.vendor_bundle)] {
            if name.is_empty() || name.contains('/') {
                diag.error(field, "must be a plain file name");
            }
        }
        if self.bundle == self.vendor_bundle {
            diag.error("scripts.vendor_bundle", "must differ from scripts.bundle");
        }
    }
}

/// Feature-detection bundle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModernizrConfig {
    pub output: String,
    /// API options compiled into the bundle.
    pub options: Vec<String>,
    /// Detects always included, whether referenced or not.
    pub tests: Vec<String>,
}

impl Default for ModernizrConfig {
    fn default() -> Self {
        Self {
            output: "modernizr.js".into(),
            options: vec![
                "setClasses".into(),
                "addTest".into(),
                "html5printshiv".into(),
                "testProp".into(),
            ],
            tests: Vec::new(),
        }
    }
}

impl ModernizrConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        use crate::pipeline::transform::modernizr::{is_known_detect, is_known_option};

        for option in &self.options {
            if !is_known_option(option) {
                diag.error("modernizr.options", format!("unknown option `{option}`"));
            }
        }
        for test in &self.tests {
            if !is_known_detect(test) {
                diag.error("modernizr.tests", format!("unknown detect `{test}`"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_scripts_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.scripts.bundle, "main.js");
        assert!(!config.scripts.lint_strict);
        assert_eq!(config.modernizr.options.len(), 4);
    }

    #[test]
    fn test_bundle_names_must_differ() {
        let config = test_parse_config("[scripts]\nvendor_bundle = \"main.js\"");
        let mut diag = ConfigDiagnostics::new();
        config.scripts.validate(&mut diag);
        assert!(!diag.is_empty());
    }

    #[test]
    fn test_unknown_modernizr_option() {
        let config = test_parse_config("[modernizr]\noptions = [\"setClasses\", \"teleport\"]");
        let mut diag = ConfigDiagnostics::new();
        config.modernizr.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }
}
