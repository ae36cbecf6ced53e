use std::time::{Duration, Instant};

use super::debouncer::{DebounceMode, Debouncer};
use super::error::WatchError;
use crate::utils::glob::PatternSet;

/// Browser refresh flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Reload the whole page.
    Full,
    /// Re-fetch stylesheets only.
    Css,
}

/// What a binding does once its debounce window closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Run these tasks (and their prerequisites) in one resolution.
    Run(Vec<String>),
    Reload(ReloadKind),
}

/// Emitted when a binding fires.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub binding: String,
    pub action: WatchAction,
    /// Root-relative paths that changed during the window.
    pub paths: Vec<String>,
}

/// Glob pattern set mapped to an action, with its own debounce timer.
#[derive(Debug)]
pub struct WatchBinding {
    name: String,
    patterns: PatternSet,
    action: WatchAction,
    debouncer: Debouncer,
    changed: Vec<String>,
}

impl WatchBinding {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        patterns: &[S],
        action: WatchAction,
        window: Duration,
        mode: DebounceMode,
    ) -> Result<Self, WatchError> {
        let name = name.into();
        let patterns = PatternSet::new(patterns).map_err(|source| WatchError::Pattern {
            binding: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            patterns,
            action,
            debouncer: Debouncer::new(window, mode),
            changed: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &WatchAction {
        &self.action
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Feed a changed path. Returns true if the binding is interested.
    pub fn observe(&mut self, rel_path: &str, now: Instant) -> bool {
        if !self.patterns.is_match(rel_path) {
            return false;
        }
        self.debouncer.on_event(now);
        if !self.changed.iter().any(|p| p == rel_path) {
            self.changed.push(rel_path.to_string());
        }
        true
    }

    /// Fire if the window has closed.
    pub fn poll(&mut self, now: Instant) -> Option<Trigger> {
        if !self.debouncer.poll(now) {
            return None;
        }
        Some(Trigger {
            binding: self.name.clone(),
            action: self.action.clone(),
            paths: std::mem::take(&mut self.changed),
        })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }
}
