//! Score submission DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Score submission request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    /// Submitting user (must be >= 1)
    #[validate(range(min = 1))]
    #[schema(example = 42)]
    pub user_id: u64,
    /// Target game (must be >= 1)
    #[validate(range(min = 1))]
    #[schema(example = 7)]
    pub game_id: u64,
    /// Score value (must be >= 0)
    #[validate(range(min = 0))]
    #[schema(example = 12500)]
    pub score: i64,
    /// Submission time, milliseconds since the Unix epoch
    #[schema(example = 1_700_000_000_000_i64)]
    pub timestamp: i64,
}

/// Submission acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitScoreResponse {
    /// Always true on a 202
    #[schema(example = true)]
    pub accepted: bool,
}
