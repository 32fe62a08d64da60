//! Error types for framedc-cache

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, CacheError>;

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Another master owns this namespace. Fail fast; never wait.
    #[error("lock conflict: {} exists — another indexer owns this namespace (if its owner crashed, remove the stale lock by hand)", .0.display())]
    LockHeld(PathBuf),

    /// The namespace file is required but absent (status queries).
    #[error("namespace not found: {}", .0.display())]
    NamespaceMissing(PathBuf),

    /// The index store image carries an unknown format version.
    #[error("index store {}: format version {found} (this build reads {expected})", .path.display())]
    StoreVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Serialization / deserialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O failure with the path that produced it
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CacheError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

impl From<postcard::Error> for CacheError {
    fn from(e: postcard::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}
