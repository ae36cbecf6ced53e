//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"
//! port = 9000
//! reload_port = 35729
//! roots = [".tmp", "app"]
//!
//! [serve.routes]
//! "/bower_components" = "bower_components"
//! ```
//!
//! Roots are searched in order; the first one containing the requested file
//! answers. Routes map a URL prefix to an extra directory and take
//! precedence over roots.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for live reload.
    pub reload_port: u16,

    /// Static roots, first match wins.
    pub roots: Vec<PathBuf>,

    /// URL prefix to directory.
    pub routes: BTreeMap<String, PathBuf>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 9000,
            reload_port: 35729,
            roots: vec![PathBuf::from(".tmp"), PathBuf::from("app")],
            routes: BTreeMap::from([(
                "/bower_components".to_string(),
                PathBuf::from("bower_components"),
            )]),
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.roots.is_empty() {
            diag.error("serve.roots", "at least one root directory is required");
        }
        if self.port == self.reload_port {
            diag.error_with_hint(
                "serve.reload_port",
                format!("conflicts with serve.port ({})", self.port),
                "the live reload socket needs its own port",
            );
        }
        for prefix in self.routes.keys() {
            if !prefix.starts_with('/') || prefix == "/" {
                diag.error(
                    "serve.routes",
                    format!("route `{prefix}` must be a non-root URL prefix starting with `/`"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_serve_config() {
        let config = test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080");

        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.reload_port, 35729);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.serve.roots.len(), 2);
        assert_eq!(config.serve.roots[0].to_str(), Some(".tmp"));
        assert_eq!(
            config.serve.routes.get("/bower_components").and_then(|p| p.to_str()),
            Some("bower_components")
        );
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_serve_port_conflict() {
        let config = test_parse_config("[serve]\nport = 35729");
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, "serve.reload_port");
    }

    #[test]
    fn test_serve_routes_override() {
        let config = test_parse_config("[serve.routes]\n\"/vendor\" = \"node_modules\"");
        assert_eq!(config.serve.routes.len(), 1);
        assert!(config.serve.routes.contains_key("/vendor"));
    }
}
