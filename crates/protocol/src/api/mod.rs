//! HTTP API DTOs

pub mod leaderboard;
pub mod scores;
