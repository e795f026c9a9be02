//! Read-path facade and ingest validation.
//!
//! Translates `(game_id, window_key?)` pairs into a view, applies the
//! business rules the HTTP layer cannot check (timestamp not in the
//! future), and shapes query responses.

use std::sync::Arc;

use podium_core::{CoreError, Leaderboard, ScoreEntry, board, window};

use crate::error::EngineError;
use crate::manager::LeaderboardManager;
use crate::time::now_ms;

/// Largest accepted `limit` for top-K queries.
pub const MAX_LIMIT: i64 = 1000;

/// One row of a top-K response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: usize,
    pub entry: ScoreEntry,
}

/// A user's standing within one view.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRankInfo {
    pub rank: usize,
    pub score: i64,
    pub percentile: f64,
    pub timestamp_ms: i64,
}

#[derive(Clone)]
pub struct ScoreService {
    manager: Arc<LeaderboardManager>,
}

impl ScoreService {
    pub fn new(manager: Arc<LeaderboardManager>) -> Self {
        Self { manager }
    }

    /// Validate and ingest one submission.
    pub fn submit(
        &self,
        user_id: u64,
        game_id: u64,
        score: i64,
        timestamp_ms: i64,
    ) -> Result<(), EngineError> {
        if score < 0 {
            return Err(CoreError::InvalidScore(format!("score must be >= 0, got {score}")).into());
        }
        if timestamp_ms > now_ms() {
            return Err(CoreError::InvalidScore(format!(
                "timestamp {timestamp_ms} is in the future"
            ))
            .into());
        }
        self.manager.record_score(ScoreEntry::new(user_id, game_id, score, timestamp_ms))
    }

    /// Top `limit` entries of a view, paired with 1-based ranks.
    pub fn top_k(
        &self,
        game_id: u64,
        limit: i64,
        window_key: Option<&str>,
    ) -> Result<Vec<RankedEntry>, EngineError> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(EngineError::InvalidLimit(limit));
        }
        let view = self.resolve_view(game_id, window_key)?;
        Ok(view
            .top_k(limit as usize)
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RankedEntry { rank: i + 1, entry })
            .collect())
    }

    /// A user's rank, score, and percentile within a view.
    pub fn user_rank(
        &self,
        game_id: u64,
        user_id: u64,
        window_key: Option<&str>,
    ) -> Result<UserRankInfo, EngineError> {
        let view = self.resolve_view(game_id, window_key)?;
        let entry = view.user_score(user_id).ok_or(CoreError::UserNotFoundInView(user_id))?;
        let rank = view.user_rank(user_id).ok_or(CoreError::UserNotFoundInView(user_id))?;
        let total = view.len();
        Ok(UserRankInfo {
            rank,
            score: entry.score,
            percentile: board::percentile(rank, total),
            timestamp_ms: entry.timestamp_ms,
        })
    }

    /// Resolve a view reference. A missing or empty window key selects
    /// the all-time view; anything else must be syntactically valid AND
    /// configured. An unconfigured-but-valid key is the same error as a
    /// malformed one.
    fn resolve_view(
        &self,
        game_id: u64,
        window_key: Option<&str>,
    ) -> Result<Arc<Leaderboard>, EngineError> {
        let set = self.manager.get_game_set(game_id).ok_or(CoreError::GameNotFound(game_id))?;
        match window_key {
            None | Some("") => Ok(set.all_time()),
            Some(key) => {
                if !window::is_valid_key(key) {
                    return Err(CoreError::InvalidWindow(key.to_string()).into());
                }
                set.get_view(Some(key))
                    .ok_or_else(|| CoreError::InvalidWindow(key.to_string()).into())
            }
        }
    }
}
