//! File watcher with per-binding debounce.
//!
//! ```text
//! notify ──► event loop ──► WatchBinding (glob match + debounce) ──► Trigger
//! ```
//!
//! Every binding owns a [`Debouncer`]; a burst of changes matching one
//! binding yields exactly one [`Trigger`], sent on the channel given to
//! [`FileWatcher::start`]. Bindings fire independently of each other.

mod binding;
mod debouncer;
mod error;
mod watch_roots;

#[cfg(test)]
mod tests;

pub use binding::{ReloadKind, Trigger, WatchAction, WatchBinding};
pub use debouncer::DebounceMode;
pub use error::WatchError;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::utils::glob::relative_slash_path;
use crate::utils::path::normalize_path;
use crate::{debug, log};
use watch_roots::{WatchRoots, collect_roots};

/// Wake-up interval while some roots do not exist yet.
const REATTACH_INTERVAL: Duration = Duration::from_millis(500);
/// Idle wake-up interval.
const IDLE_INTERVAL: Duration = Duration::from_secs(3600);

/// A set of bindings over one project root.
pub struct FileWatcher {
    root: PathBuf,
    bindings: Vec<WatchBinding>,
}

impl FileWatcher {
    pub fn new(root: &Path) -> Self {
        Self {
            root: normalize_path(root),
            bindings: Vec::new(),
        }
    }

    pub fn bind(&mut self, binding: WatchBinding) {
        self.bindings.push(binding);
    }

    /// Attach OS watches and spawn the event loop.
    ///
    /// Must be called inside a tokio runtime. Attach failures are returned
    /// here; roots that do not exist yet are attached once they appear.
    pub fn start(self, triggers: mpsc::UnboundedSender<Trigger>) -> Result<WatchHandle, WatchError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })
        .map_err(WatchError::Create)?;

        let mut roots = WatchRoots::new(collect_roots(&self.root, &self.bindings));
        roots.attach_existing(&mut watcher)?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let event_loop = EventLoop {
            root: self.root,
            bindings: self.bindings,
            watcher,
            roots,
        };
        let task = tokio::spawn(event_loop.run(event_rx, stop_rx, triggers));

        Ok(WatchHandle {
            stop: Some(stop_tx),
            task: Some(task),
        })
    }
}

/// Cancellation handle. Dropping it stops the watcher too.
pub struct WatchHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stop watching. Calling it again has no effect.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Stop and wait until OS watches are released.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Event loop
// ============================================================================

struct EventLoop {
    root: PathBuf,
    bindings: Vec<WatchBinding>,
    /// Dropped when the loop ends, which releases every OS watch.
    watcher: RecommendedWatcher,
    roots: WatchRoots,
}

impl EventLoop {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
        mut stop: oneshot::Receiver<()>,
        triggers: mpsc::UnboundedSender<Trigger>,
    ) {
        loop {
            let wake = self.next_wakeup(Instant::now());

            tokio::select! {
                biased;
                _ = &mut stop => break,
                event = events.recv() => match event {
                    Some(Ok(event)) => self.observe(&event),
                    Some(Err(e)) => log!("watch"; "notify error: {}", e),
                    None => break,
                },
                _ = tokio::time::sleep(wake) => self.roots.maintain(&mut self.watcher),
            }

            let now = Instant::now();
            for binding in &mut self.bindings {
                let Some(trigger) = binding.poll(now) else {
                    continue;
                };
                debug!("watch"; "{} fired: {}", trigger.binding, trigger.paths.join(", "));
                if triggers.send(trigger).is_err() {
                    return;
                }
            }
        }
        debug!("watch"; "stopped");
    }

    fn observe(&mut self, event: &notify::Event) {
        if !is_content_change(&event.kind) {
            return;
        }
        let now = Instant::now();
        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let Some(rel) = relative_slash_path(&self.root, path) else {
                continue;
            };
            for binding in &mut self.bindings {
                if binding.observe(&rel, now) {
                    debug!("watch"; "{} ← {}", binding.name(), rel);
                }
            }
        }
    }

    fn next_wakeup(&self, now: Instant) -> Duration {
        let fallback = if self.roots.all_attached() {
            IDLE_INTERVAL
        } else {
            REATTACH_INTERVAL
        };
        self.bindings
            .iter()
            .filter_map(WatchBinding::deadline)
            .min()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(fallback)
            .min(fallback)
    }
}

/// Create, remove and data/name modifications count; metadata and access
/// events do not.
fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(modify) => !matches!(modify, notify::event::ModifyKind::Metadata(_)),
        _ => false,
    }
}

/// Editor artifacts and hidden files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
