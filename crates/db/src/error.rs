//! Store error types.

use std::path::PathBuf;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store path {path:?} is a directory")]
    PathIsDirectory { path: PathBuf },
    #[error("store path {path:?} is not writable: {source}")]
    PathNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open store: {0}")]
    Open(#[source] sqlx::Error),
    #[error("failed to initialize schema: {0}")]
    Init(#[from] sqlx::migrate::MigrateError),
    #[error("store write failed: {0}")]
    Write(#[source] sqlx::Error),
    #[error("store read failed: {0}")]
    Read(#[source] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
