//! Error types for the persistence layer.

use thiserror::Error;

/// Errors that can occur while logging, snapshotting, or recovering.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error on the log or snapshot files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk state cannot be trusted; recovery must abort.
    #[error("Corrupt persisted state: {0}")]
    Corrupt(String),
}
