//! Error types for the storage layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`crate::store::TaskStore`].
///
/// A corrupt task file is fatal at startup: the server must not silently run
/// with an empty store in place of data that is actually present on disk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode task file: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
