//! File pipelines: glob → stages → destination.
//!
//! ```text
//! SourceSet ──read──► [Each | All]* ──write──► dest/
//!     │                  │
//!     │                  └─ Each runs per file on rayon, All sees the whole set
//!     └─ gulp-style bases: app/styles/**/*.scss writes main.scss as <dest>/main.css
//! ```
//!
//! A failing file drops out of the remaining stages; its siblings still
//! complete and are written. The step then fails with every file error
//! ([`ErrorPolicy::Fail`]) or logs them and succeeds ([`ErrorPolicy::Warn`]).

mod asset;
mod error;
mod source;
mod stage;
pub mod transform;

#[cfg(test)]
mod tests;

pub use asset::Asset;
pub use error::{FileError, PipelineError};
pub use source::SourceSet;
pub use stage::{Combine, Stage, Transform};

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{debug, log};

/// What a step does with per-file errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    #[default]
    Fail,
    Warn,
}

/// Outcome of a successful step.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Files matched by the source set.
    pub matched: usize,
    /// Destination paths, in output order. Includes unchanged files.
    pub written: Vec<PathBuf>,
    /// Total bytes of the outputs.
    pub bytes: u64,
    /// Files dropped by a warned error.
    pub warned: usize,
}

/// One build step.
pub struct Pipeline {
    name: String,
    sources: SourceSet,
    stages: Vec<Stage>,
    dest: Option<PathBuf>,
    policy: ErrorPolicy,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, sources: SourceSet) -> Self {
        Self {
            name: name.into(),
            sources,
            stages: Vec::new(),
            dest: None,
            policy: ErrorPolicy::default(),
        }
    }

    /// Append a per-file stage.
    pub fn each(mut self, transform: impl Transform + 'static) -> Self {
        self.stages.push(Stage::Each(Box::new(transform)));
        self
    }

    /// Append a whole-set stage.
    pub fn all(mut self, combine: impl Combine + 'static) -> Self {
        self.stages.push(Stage::All(Box::new(combine)));
        self
    }

    /// Destination directory. Without one, the step only runs its stages.
    pub fn dest(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dest = Some(dir.into());
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let files = self.sources.collect();
        let matched = files.len();
        let mut errors = Vec::new();

        let read: Vec<_> = files
            .into_par_iter()
            .map(|file| match fs::read(&file.path) {
                Ok(contents) => Ok(Asset::from_source(file.path, file.rel, contents)),
                Err(e) => Err(self.file_error(file.path, "read", e.into())),
            })
            .collect();
        let mut assets = partition(read, &mut errors);

        for stage in &self.stages {
            debug!("pipeline"; "{}: {} ({} file(s))", self.name, stage.name(), assets.len());
            assets = match stage {
                Stage::Each(transform) => {
                    let results: Vec<_> = assets
                        .into_par_iter()
                        .map(|asset| {
                            let path = display_path(&asset);
                            transform
                                .apply(asset)
                                .map_err(|e| self.file_error(path, transform.name(), e))
                        })
                        .collect();
                    partition(results, &mut errors)
                        .into_iter()
                        .flatten()
                        .collect()
                }
                Stage::All(combine) => {
                    combine
                        .combine(assets)
                        .map_err(|error| PipelineError::Stage {
                            step: self.name.clone(),
                            stage: combine.name().to_string(),
                            error,
                        })?
                }
            };
        }

        let mut report = PipelineReport {
            matched,
            ..PipelineReport::default()
        };

        if let Some(dest) = &self.dest {
            fs::create_dir_all(dest).map_err(|error| PipelineError::Io {
                step: self.name.clone(),
                path: dest.clone(),
                error,
            })?;
            let written: Vec<_> = assets
                .par_iter()
                .map(|asset| {
                    write_asset(dest, asset)
                        .map_err(|e| self.file_error(dest.join(&asset.path), "write", e.into()))
                })
                .collect();
            for path in partition(written, &mut errors) {
                report.bytes += fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                report.written.push(path);
            }
        }

        debug!("pipeline"; "{}: {} matched, {} written", self.name, matched, report.written.len());

        if errors.is_empty() {
            return Ok(report);
        }
        match self.policy {
            ErrorPolicy::Fail => Err(PipelineError::Files {
                step: self.name.clone(),
                errors,
            }),
            ErrorPolicy::Warn => {
                for error in &errors {
                    log!("warning"; "{}: {}", self.name, error);
                }
                report.warned = errors.len();
                Ok(report)
            }
        }
    }

    fn file_error(&self, path: PathBuf, stage: &str, error: anyhow::Error) -> FileError {
        let path = path
            .strip_prefix(self.sources.root())
            .map(Path::to_path_buf)
            .unwrap_or(path);
        FileError {
            path,
            stage: stage.to_string(),
            error,
        }
    }
}

fn partition<T>(results: Vec<Result<T, FileError>>, errors: &mut Vec<FileError>) -> Vec<T> {
    let mut ok = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(value) => ok.push(value),
            Err(e) => errors.push(e),
        }
    }
    ok
}

fn display_path(asset: &Asset) -> PathBuf {
    asset.source.clone().unwrap_or_else(|| asset.path.clone())
}

/// Write an output, leaving identical files untouched so watchers see no
/// event.
fn write_asset(dest: &Path, asset: &Asset) -> std::io::Result<PathBuf> {
    let target = dest.join(&asset.path);
    if fs::read(&target).is_ok_and(|existing| existing == asset.contents) {
        return Ok(target);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &asset.contents)?;
    Ok(target)
}
