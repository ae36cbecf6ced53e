//! Source file collection from glob pattern sets.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::utils::glob::{Pattern, PatternSet, relative_slash_path};

/// A matched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the base of the pattern that matched.
    pub rel: PathBuf,
}

/// Compiled include/exclude patterns anchored at the project root.
#[derive(Debug, Clone)]
pub struct SourceSet {
    root: PathBuf,
    patterns: PatternSet,
}

impl SourceSet {
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self, globset::Error> {
        Ok(Self {
            root: root.to_path_buf(),
            patterns: PatternSet::new(patterns)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Matching files, grouped by pattern in declaration order and sorted
    /// within each group. A file matched by several patterns appears once,
    /// under the first.
    ///
    /// Wildcards skip dotfiles and dot-directories below a pattern's base.
    pub fn collect(&self) -> Vec<SourceFile> {
        let mut files = Vec::new();
        for pattern in self.patterns.includes() {
            if pattern.is_literal() {
                let path = self.root.join(pattern.as_str().trim_start_matches("./"));
                if path.is_file() && self.claims(pattern, &path) {
                    let rel = path.file_name().map(PathBuf::from).unwrap_or_default();
                    files.push(SourceFile { path, rel });
                }
                continue;
            }

            let base = self.root.join(pattern.base());
            if !base.is_dir() {
                continue;
            }
            let depth = if pattern.is_recursive() { usize::MAX } else { 1 };
            let mut group: Vec<SourceFile> = WalkDir::new(&base)
                .sort(true)
                .skip_hidden(false)
                .max_depth(depth)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| e.path())
                .filter(|path| !has_hidden_component(&base, path))
                .filter(|path| self.claims(pattern, path))
                .filter_map(|path| {
                    let rel = path.strip_prefix(&base).ok()?.to_path_buf();
                    Some(SourceFile { path, rel })
                })
                .collect();
            group.sort_by(|a, b| a.rel.cmp(&b.rel));
            files.extend(group);
        }
        files
    }

    /// Whether `pattern` is the first include matching `path`.
    fn claims(&self, pattern: &Pattern, path: &Path) -> bool {
        relative_slash_path(&self.root, path)
            .and_then(|rel| self.patterns.matching(&rel).map(|p| std::ptr::eq(p, pattern)))
            .unwrap_or(false)
    }
}

fn has_hidden_component(base: &Path, path: &Path) -> bool {
    path.strip_prefix(base).is_ok_and(|rel| {
        rel.components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
    })
}
