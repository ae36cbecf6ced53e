use std::path::PathBuf;

use thiserror::Error;

/// Watch setup errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("invalid glob pattern in watch binding `{binding}`")]
    Pattern {
        binding: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to watch `{path}`")]
    Attach {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to create file watcher")]
    Create(#[source] notify::Error),
}
