//! Per-game leaderboard query routes

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};

use crate::{error::ApiError, state::AppState};
use podium_protocol::api::leaderboard::{LeaderEntry, LeadersQuery, RankQuery, UserRankResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{game_id}/leaders", get(get_leaders))
        .route("/{game_id}/users/{user_id}/rank", get(get_user_rank))
}

/// Get the top of a leaderboard
///
/// Returns the highest-ranked entries of the selected view: all-time by
/// default, or a configured sliding window via `window`.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/leaders",
    params(
        ("game_id" = u64, Path, description = "Game to query"),
        ("limit" = Option<i64>, Query, description = "Maximum entries to return (1..=1000, default: 10)"),
        ("window" = Option<String>, Query, description = "Window key (e.g. 24h); omit for all-time"),
    ),
    responses(
        (status = 200, description = "Ranked entries, best first", body = [LeaderEntry]),
        (status = 400, description = "Malformed window key or out-of-range limit"),
        (status = 404, description = "Unknown game"),
    ),
    tag = "games"
)]
pub async fn get_leaders(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
    Query(query): Query<LeadersQuery>,
) -> Result<Json<Vec<LeaderEntry>>, ApiError> {
    let ranked = state.service().top_k(game_id, query.limit, query.window.as_deref())?;

    let entries = ranked
        .into_iter()
        .map(|r| LeaderEntry {
            user_id: r.entry.user_id,
            score: r.entry.score,
            timestamp: r.entry.timestamp_ms,
            rank: r.rank as u32,
        })
        .collect();

    Ok(Json(entries))
}

/// Get a user's rank
///
/// Returns the user's rank, score, and percentile within the selected
/// view.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/users/{user_id}/rank",
    params(
        ("game_id" = u64, Path, description = "Game to query"),
        ("user_id" = u64, Path, description = "User to look up"),
        ("window" = Option<String>, Query, description = "Window key (e.g. 24h); omit for all-time"),
    ),
    responses(
        (status = 200, description = "The user's standing", body = UserRankResponse),
        (status = 400, description = "Malformed window key"),
        (status = 404, description = "Unknown game, or user absent from the view"),
    ),
    tag = "games"
)]
pub async fn get_user_rank(
    State(state): State<AppState>,
    Path((game_id, user_id)): Path<(u64, u64)>,
    Query(query): Query<RankQuery>,
) -> Result<Json<UserRankResponse>, ApiError> {
    let info = state.service().user_rank(game_id, user_id, query.window.as_deref())?;

    Ok(Json(UserRankResponse {
        user_id,
        rank: info.rank as u32,
        score: info.score,
        percentile: info.percentile,
        timestamp: info.timestamp_ms,
    }))
}
