//! Score ingest route

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use validator::Validate;

use crate::{error::ApiError, state::AppState};
use podium_protocol::api::scores::{SubmitScoreRequest, SubmitScoreResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_score))
}

/// Submit a score
///
/// Accepts one score for one user in one game. The entry is durably
/// logged and visible to leaderboard queries before the response is
/// sent.
#[utoipa::path(
    post,
    path = "/api/v1/scores",
    request_body = SubmitScoreRequest,
    responses(
        (status = 202, description = "Score accepted", body = SubmitScoreResponse),
        (status = 400, description = "Invalid submission (ids < 1, negative score, or future timestamp)"),
    ),
    tag = "scores"
)]
pub async fn submit_score(
    State(state): State<AppState>,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<(StatusCode, Json<SubmitScoreResponse>), ApiError> {
    req.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.service().submit(req.user_id, req.game_id, req.score, req.timestamp)?;

    Ok((StatusCode::ACCEPTED, Json(SubmitScoreResponse { accepted: true })))
}
