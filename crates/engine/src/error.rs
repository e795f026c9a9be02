//! Engine error types

use podium_core::CoreError;
use podium_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Domain-level rejection (bad submission, unknown game/user/window).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// WAL append, snapshot write, or recovery read failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),

    /// Query limit outside the accepted range.
    #[error("Invalid limit: {0} (expected 1..=1000)")]
    InvalidLimit(i64),
}
