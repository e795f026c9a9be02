//! Leaderboard query DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Query parameters for the top-K endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadersQuery {
    /// Maximum entries to return (default: 10, max: 1000)
    #[serde(default = "default_limit")]
    #[schema(example = 10)]
    pub limit: i64,
    /// Window key (e.g. `24h`); omitted or empty selects the all-time view
    #[serde(default)]
    #[schema(example = "24h")]
    pub window: Option<String>,
}

fn default_limit() -> i64 {
    10
}

impl Default for LeadersQuery {
    fn default() -> Self {
        Self { limit: default_limit(), window: None }
    }
}

/// Query parameters for the user-rank endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RankQuery {
    /// Window key; omitted or empty selects the all-time view
    #[serde(default)]
    #[schema(example = "24h")]
    pub window: Option<String>,
}

/// Single entry in a top-K response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderEntry {
    /// User holding this rank
    #[schema(example = 42)]
    pub user_id: u64,
    /// Score value
    #[schema(example = 12500)]
    pub score: i64,
    /// Submission time, milliseconds since the Unix epoch
    #[schema(example = 1_700_000_000_000_i64)]
    pub timestamp: i64,
    /// Rank on the leaderboard (1-indexed)
    #[schema(example = 1)]
    pub rank: u32,
}

/// A user's standing within one view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRankResponse {
    /// User the standing belongs to
    #[schema(example = 42)]
    pub user_id: u64,
    /// Rank on the leaderboard (1-indexed)
    #[schema(example = 3)]
    pub rank: u32,
    /// Score value
    #[schema(example = 12500)]
    pub score: i64,
    /// Percentile: 100.0 for rank 1, 100/N for the last rank
    #[schema(example = 98.5)]
    pub percentile: f64,
    /// Submission time, milliseconds since the Unix epoch
    #[schema(example = 1_700_000_000_000_i64)]
    pub timestamp: i64,
}
