//! Error types for framedc-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Fragment wire codec failure (corrupt or truncated bytes)
    #[error("Fragment codec error: {0}")]
    Codec(#[from] postcard::Error),
}
