//! Development HTTP server.
//!
//! Serves the configured roots (first match wins) plus URL-prefix routes,
//! and hands HTML pages a live reload client pointing at the WebSocket port.

mod path;
mod response;

pub use path::ServeRoots;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tiny_http::{Request, Server};

use crate::config::SiteConfig;
use crate::embed::serve::LIVERELOAD_URL;
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;
/// Request handler threads.
const WORKERS: usize = 4;

/// Bound server ready to accept requests.
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    roots: Arc<ServeRoots>,
    reload_port: Option<u16>,
}

impl DevServer {
    /// Bind to the configured interface and port, retrying on the next ports.
    pub fn bind(config: &SiteConfig, reload_port: Option<u16>) -> Result<Self> {
        let roots = ServeRoots::new(
            config.serve.roots.iter().map(|r| config.root_join(r)).collect(),
            config
                .serve
                .routes
                .iter()
                .map(|(prefix, dir)| (prefix.clone(), config.root_join(dir)))
                .collect(),
        );
        Self::bind_roots(config.serve.interface, config.serve.port, roots, reload_port)
    }

    fn bind_roots(
        interface: IpAddr,
        port: u16,
        roots: ServeRoots,
        reload_port: Option<u16>,
    ) -> Result<Self> {
        let (server, addr) = bind_with_retry(interface, port)?;
        Ok(Self {
            server: Arc::new(server),
            addr,
            roots: Arc::new(roots),
            reload_port,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle for unblocking [`DevServer::run`] from another thread.
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Request loop. Returns once the server is unblocked.
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKERS)
            .thread_name(|i| format!("sitekit-http-{i}"))
            .build()?;

        for request in self.server.incoming_requests() {
            let roots = Arc::clone(&self.roots);
            let reload_port = self.reload_port;
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &roots, reload_port) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

fn handle_request(request: Request, roots: &ServeRoots, reload_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !response::is_allowed_method(&request) {
        return response::respond_method_not_allowed(request);
    }

    if let Some(port) = reload_port
        && request.url() == LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    match roots.resolve(request.url()) {
        Some(path) => response::respond_file(request, &path, reload_port),
        None => response::respond_not_found(request),
    }
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match Server::http(SocketAddr::new(interface, port)) {
            Ok(server) => {
                let addr = server
                    .server_addr()
                    .to_ip()
                    .unwrap_or_else(|| SocketAddr::new(interface, port));
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpStream};

    use tempfile::TempDir;

    use super::*;

    fn get(addr: SocketAddr, method: &str, url: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "{method} {url} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_serves_html_with_reload_client() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".tmp")).unwrap();
        fs::write(dir.path().join(".tmp/index.html"), "<html><body>hi</body></html>").unwrap();

        let roots = ServeRoots::new(vec![dir.path().join(".tmp")], Vec::new());
        let server =
            DevServer::bind_roots(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, roots, Some(35729)).unwrap();
        let addr = server.addr();
        let handle = server.handle();
        let thread = std::thread::spawn(move || server.run());

        let page = get(addr, "GET", "/");
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains(&format!("<script src=\"{LIVERELOAD_URL}\"")));

        let js = get(addr, "GET", LIVERELOAD_URL);
        assert!(js.contains("35729"));

        assert!(get(addr, "GET", "/nope.css").starts_with("HTTP/1.1 404"));
        assert!(get(addr, "POST", "/").starts_with("HTTP/1.1 405"));

        handle.unblock();
        thread.join().unwrap().unwrap();
    }
}
