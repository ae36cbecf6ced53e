use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use super::binding::WatchBinding;
use super::error::WatchError;

/// Directory to attach, with its recursion mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct WatchRoot {
    pub(super) path: PathBuf,
    pub(super) recursive: bool,
}

impl WatchRoot {
    fn mode(&self) -> RecursiveMode {
        if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        }
    }
}

/// Pattern bases of every binding, deduplicated.
///
/// A recursive root swallows any root below it, and a directory requested
/// both flat and recursive is attached recursively.
pub(super) fn collect_roots(root: &Path, bindings: &[WatchBinding]) -> Vec<WatchRoot> {
    let mut roots: Vec<WatchRoot> = Vec::new();

    for pattern in bindings.iter().flat_map(|b| b.patterns().includes()) {
        let path = root.join(pattern.base());
        let recursive = pattern.is_recursive();

        if let Some(existing) = roots.iter_mut().find(|r| r.path == path) {
            existing.recursive |= recursive;
        } else {
            roots.push(WatchRoot { path, recursive });
        }
    }

    let covered: Vec<PathBuf> = roots
        .iter()
        .filter(|r| r.recursive)
        .map(|r| r.path.clone())
        .collect();
    roots.retain(|r| {
        !covered
            .iter()
            .any(|parent| r.path != *parent && r.path.starts_with(parent))
    });
    roots.sort_by(|a, b| a.path.cmp(&b.path));
    roots
}

/// Attach existing roots and re-attach roots that appear later.
pub(super) struct WatchRoots {
    desired: Vec<WatchRoot>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(desired: Vec<WatchRoot>) -> Self {
        Self {
            desired,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> Result<(), WatchError> {
        for root in &self.desired {
            if !root.path.is_dir() {
                crate::debug!("watch"; "not yet present: {}", root.path.display());
                continue;
            }
            watcher
                .watch(&root.path, root.mode())
                .map_err(|source| WatchError::Attach {
                    path: root.path.clone(),
                    source,
                })?;
            self.attached.insert(root.path.clone());
        }
        Ok(())
    }

    /// Drop handles of vanished roots and attach newly created ones.
    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.is_dir());

        for root in &self.desired {
            if self.attached.contains(&root.path) || !root.path.is_dir() {
                continue;
            }
            if watcher.watch(&root.path, root.mode()).is_ok() {
                self.attached.insert(root.path.clone());
                crate::debug!("watch"; "attached: {}", root.path.display());
            }
        }
    }

    pub(super) fn all_attached(&self) -> bool {
        self.attached.len() == self.desired.len()
    }
}
