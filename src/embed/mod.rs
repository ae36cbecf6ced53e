//! Resources compiled into the binary.
//!
//! - `template` - Typed placeholder substitution
//! - `serve` - Development server client (livereload.js, minified by build.rs)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the injected `<script>` tag loads the client from.
    pub const LIVERELOAD_URL: &str = "/__sitekit/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__LIVERELOAD_PORT__", &self.port.to_string())
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")));

    /// Tag inserted into served HTML pages.
    pub fn script_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}" async></script>"#)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_port_is_substituted() {
            let js = LIVERELOAD_JS.render(&LivereloadVars { port: 35730 });
            assert!(js.contains("35730"));
            assert!(!js.contains("__LIVERELOAD_PORT__"));
        }
    }
}
