use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A file that failed inside a step.
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    /// Stage name, or `read` / `write` for I/O.
    pub stage: String,
    pub error: anyhow::Error,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {:#}", self.path.display(), self.stage, self.error)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("`{step}`: {} file(s) failed\n{}", .errors.len(), list(.errors))]
    Files { step: String, errors: Vec<FileError> },

    #[error("`{step}`: stage `{stage}` failed: {error:#}")]
    Stage {
        step: String,
        stage: String,
        error: anyhow::Error,
    },

    #[error("`{step}`: cannot create {}: {error}", .path.display())]
    Io {
        step: String,
        path: PathBuf,
        error: std::io::Error,
    },
}

impl PipelineError {
    /// File errors, empty for whole-step failures.
    pub fn file_errors(&self) -> &[FileError] {
        match self {
            Self::Files { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn list(errors: &[FileError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
