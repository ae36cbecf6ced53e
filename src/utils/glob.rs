//! Glob pattern sets with gulp-style base directories.
//!
//! The base of a pattern is its leading run of literal path components:
//!
//! ```text
//! app/styles/**/*.scss  → base "app/styles", recursive
//! .tmp/*.html           → base ".tmp", flat
//! bower.json            → base "", the file itself
//! !app/styles/vendor/** → exclusion
//! ```
//!
//! Output paths are computed relative to the base of the pattern that
//! matched, and watchers attach to bases.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

/// A single compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    base: PathBuf,
    recursive: bool,
    literal: bool,
    matcher: GlobMatcher,
}

impl Pattern {
    /// Compile a pattern. `*` does not cross `/`, `**` does.
    pub fn new(raw: &str) -> Result<Self, globset::Error> {
        let normalized = raw.trim_start_matches("./");
        let matcher = GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        let components: Vec<&str> = normalized.split('/').collect();
        let literal_len = components
            .iter()
            .take_while(|c| !has_glob_meta(c))
            .count();
        let literal = literal_len == components.len();

        let (base, rest) = if literal {
            // A plain file path: its directory is the base
            let split = components.len().saturating_sub(1);
            (&components[..split], &components[split..])
        } else {
            components.split_at(literal_len)
        };

        Ok(Self {
            raw: raw.to_string(),
            base: base.iter().collect(),
            recursive: rest.len() > 1 || rest.iter().any(|c| c.contains("**")),
            literal,
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Literal directory prefix, relative to the project root.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether matches may live below the base's direct children.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Whether the pattern names one file without wildcards.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// Match a root-relative path using `/` separators.
    pub fn is_match(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// Ordered include patterns plus `!`-prefixed exclusions.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut set = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_prefix('!') {
                Some(excluded) => set.excludes.push(Pattern::new(excluded)?),
                None => set.includes.push(Pattern::new(pattern)?),
            }
        }
        Ok(set)
    }

    pub fn includes(&self) -> &[Pattern] {
        &self.includes
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    /// First include pattern matching the path, unless excluded.
    pub fn matching(&self, rel_path: &str) -> Option<&Pattern> {
        if self.excludes.iter().any(|p| p.is_match(rel_path)) {
            return None;
        }
        self.includes.iter().find(|p| p.is_match(rel_path))
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        self.matching(rel_path).is_some()
    }
}

/// Root-relative path with `/` separators, `None` outside the root.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}
