//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid score submission: {0}")]
    InvalidScore(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Game not found: {0}")]
    GameNotFound(u64),

    #[error("User {0} not found in view")]
    UserNotFoundInView(u64),
}
