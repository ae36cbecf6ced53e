use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A file flowing through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Absolute source path. `None` for assets produced by a combiner.
    pub source: Option<PathBuf>,
    /// Output path, relative to the destination directory.
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    /// A generated asset with no source file.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            source: None,
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn from_source(source: PathBuf, path: PathBuf, contents: Vec<u8>) -> Self {
        Self {
            source: Some(source),
            path,
            contents,
        }
    }

    /// Contents as UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.path.display()))
    }

    pub fn set_text(&mut self, text: String) {
        self.contents = text.into_bytes();
    }

    /// Lowercased extension, empty when there is none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.path.set_extension(ext);
        self
    }

    /// Directory of the source file, for resolving relative includes.
    pub fn source_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }
}
