//! Core ranking domain for Podium
//!
//! This crate contains the in-memory leaderboard structures: score entries
//! and their total ordering, per-view ranking boards, per-game view sets,
//! and the window-key grammar.

pub mod board;
pub mod entry;
pub mod error;
pub mod game_set;
pub mod window;

pub use board::{Leaderboard, percentile};
pub use entry::ScoreEntry;
pub use error::CoreError;
pub use game_set::{ExpirationTicket, GameLeaderboardSet};
