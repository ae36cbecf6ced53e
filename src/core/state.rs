//! Shutdown signalling.
//!
//! The Ctrl+C handler sets [`SHUTDOWN`], wakes every holder of a
//! [`shutdown_receiver`] and unblocks the registered HTTP server. Before a
//! server is registered nothing needs a graceful stop, so the process exits
//! right away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

static SHUTDOWN_CHANNEL: LazyLock<(Sender<()>, Receiver<()>)> = LazyLock::new(channel::unbounded);

/// Exit status for an interrupt before anything was serving.
const INTERRUPTED: i32 = 130;

/// How often [`wait_for_shutdown`] checks the flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Install the global Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        let _ = SHUTDOWN_CHANNEL.0.send(());

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(INTERRUPTED);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server so Ctrl+C stops it instead of exiting.
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// A receiver that yields once shutdown is requested.
pub fn shutdown_receiver() -> Receiver<()> {
    SHUTDOWN_CHANNEL.1.clone()
}

/// Resolve once `shutdown` fires or the flag is already set.
pub async fn wait_for_shutdown(shutdown: Receiver<()>) {
    while !is_shutdown() && shutdown.try_recv().is_err() {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_resolves_on_signal() {
        let (tx, rx) = channel::unbounded();
        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(rx))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_pends_without_signal() {
        let (_tx, rx) = channel::unbounded::<()>();
        let waited = tokio::time::timeout(Duration::from_millis(250), wait_for_shutdown(rx)).await;
        assert!(waited.is_err());
    }
}
