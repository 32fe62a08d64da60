//! Error types for the indexer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Indexer errors
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Error from the persistent cache layer
    #[error("cache error: {0}")]
    Cache(#[from] framedc_cache::CacheError),

    /// Fragment codec error from framedc-core
    #[error("{0}")]
    Core(#[from] framedc_core::CoreError),

    /// Two scan roots share a subtree; workers would race on its fragments
    #[error("overlapping roots: {} contains {}", .outer.display(), .inner.display())]
    OverlappingRoots { outer: PathBuf, inner: PathBuf },

    /// A worker process exited nonzero; aggregation is aborted
    #[error("worker for root {} failed ({status})\n{stderr}", .root.display())]
    WorkerFailed {
        root: PathBuf,
        status: String,
        stderr: String,
    },

    /// An IPC payload carries an unknown format version
    #[error("ipc payload {}: format version {found} (this build reads {expected})", .path.display())]
    IpcVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// The index references a directory with no hot-map entry
    #[error("no hot entry for indexed directory {0}")]
    MissingHotEntry(String),

    /// I/O failure with the path that produced it
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization / deserialization failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl IndexerError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexerError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<postcard::Error> for IndexerError {
    fn from(e: postcard::Error) -> Self {
        IndexerError::Serialization(e.to_string())
    }
}
