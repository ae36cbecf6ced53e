//! WebSocket endpoint for connected browsers.
//!
//! An acceptor thread performs the handshake and keeps every client in a
//! shared set. Messages are only ever pushed; whatever a client sends is read
//! and discarded so closed connections are noticed.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Result, anyhow};
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;
use crate::{debug, log};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;
/// Acceptor poll interval.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Upper bound for a client to finish the handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

pub struct ReloadServer {
    port: u16,
    clients: Clients,
    stopped: Arc<AtomicBool>,
    acceptor: Option<JoinHandle<()>>,
}

impl ReloadServer {
    /// Bind on `interface`, trying up to ten ports from `base_port`.
    pub fn start(interface: IpAddr, base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        let clients: Clients = Arc::default();
        let stopped = Arc::new(AtomicBool::new(false));
        let acceptor = {
            let clients = Arc::clone(&clients);
            let stopped = Arc::clone(&stopped);
            std::thread::Builder::new()
                .name("sitekit-reload".into())
                .spawn(move || accept_loop(&listener, &clients, &stopped))?
        };

        debug!("reload"; "listening on {}:{}", interface, port);
        Ok(Self {
            port,
            clients,
            stopped,
            acceptor: Some(acceptor),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send to every client, dropping the ones that are gone. Returns the
    /// number of clients reached.
    pub fn broadcast(&self, message: ReloadMessage) -> usize {
        let text = message.to_json();
        let mut clients = self.clients.lock();
        clients.retain_mut(|ws| match ws.send(Message::Text(text.clone().into())) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client dropped: {}", e);
                false
            }
        });
        debug!("reload"; "{} sent to {} client(s)", text, clients.len());
        clients.len()
    }

    /// Close every connection and stop accepting new ones.
    pub fn close(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

impl Drop for ReloadServer {
    fn drop(&mut self) {
        self.close();
    }
}

fn accept_loop(listener: &TcpListener, clients: &Clients, stopped: &AtomicBool) {
    while !stopped.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => match handshake(stream) {
                Ok(ws) => {
                    let mut clients = clients.lock();
                    clients.push(ws);
                    debug!("reload"; "client connected: {} (total: {})", addr, clients.len());
                }
                Err(e) => debug!("reload"; "handshake with {} failed: {}", addr, e),
            },
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                prune(clients);
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                log!("reload"; "accept error: {}", e);
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

/// Blocking handshake, then non-blocking so reads in [`prune`] never stall.
fn handshake(stream: TcpStream) -> Result<WebSocket<TcpStream>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    let ws = tungstenite::accept(stream).map_err(|e| anyhow!("{e}"))?;
    ws.get_ref().set_read_timeout(None)?;
    ws.get_ref().set_nonblocking(true)?;
    Ok(ws)
}

/// Drain pending client frames and drop closed connections.
fn prune(clients: &Clients) {
    let mut clients = clients.lock();
    clients.retain_mut(|ws| loop {
        match ws.read() {
            Ok(Message::Close(_)) => return false,
            Ok(_) => continue,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => return true,
            Err(_) => return false,
        }
    });
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind live reload socket after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
