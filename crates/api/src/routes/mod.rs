//! API routes

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::state::AppState;

pub mod games;
pub mod health;
pub mod scores;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        scores::submit_score,
        games::get_leaders,
        games::get_user_rank,
    ),
    components(schemas(
        podium_protocol::api::scores::SubmitScoreRequest,
        podium_protocol::api::scores::SubmitScoreResponse,
        podium_protocol::api::leaderboard::LeaderEntry,
        podium_protocol::api::leaderboard::UserRankResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scores", description = "Score ingest"),
        (name = "games", description = "Leaderboard queries"),
    ),
    info(
        title = "Podium API",
        version = "0.1.0",
        description = "Real-time leaderboard service"
    )
)]
pub struct ApiDoc;

/// Create the main router with all API routes
pub fn create_router(state: AppState) -> Router {
    let api_routes =
        Router::new().nest("/scores", scores::router()).nest("/games", games::router());

    let app = Router::new()
        .route("/health", axum::routing::get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state);

    // API reference UI (stateless), then the shared layers
    app.merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use podium_engine::{Engine, EngineConfig};
    use podium_storage::Durability;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn now_ms() -> i64 {
        podium_engine::time::now_ms()
    }

    fn start_app(dir: &TempDir) -> (Router, Engine) {
        let config = EngineConfig {
            wal_path: dir.path().join("wal/scores"),
            wal_archive_path: dir.path().join("wal/scores.archive"),
            snapshot_path: dir.path().join("snapshot/leaderboard"),
            snapshot_tmp_path: dir.path().join("snapshot/leaderboard.tmp"),
            durability: Durability::Flush,
            snapshot_interval: Duration::from_secs(3600),
        };
        let engine = Engine::start(config).unwrap();
        let app = create_router(AppState::new(&engine));
        (app, engine)
    }

    async fn post_score(app: &Router, body: Value) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/scores")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(request).await.unwrap().status()
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn score_body(user_id: u64, game_id: u64, score: i64, timestamp: i64) -> Value {
        json!({ "userId": user_id, "gameId": game_id, "score": score, "timestamp": timestamp })
    }

    #[tokio::test]
    async fn test_submit_then_leaders_with_tiebreaks() {
        let dir = TempDir::new().unwrap();
        let (app, engine) = start_app(&dir);
        let base = now_ms() - 10_000;

        assert_eq!(post_score(&app, score_body(1, 7, 100, base + 1000)).await, StatusCode::ACCEPTED);
        assert_eq!(post_score(&app, score_body(2, 7, 100, base + 999)).await, StatusCode::ACCEPTED);
        assert_eq!(post_score(&app, score_body(3, 7, 100, base + 1000)).await, StatusCode::ACCEPTED);

        let (status, body) = get_json(&app, "/api/v1/games/7/leaders?limit=3").await;
        assert_eq!(status, StatusCode::OK);
        let ranked: Vec<(u64, u64)> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| (e["userId"].as_u64().unwrap(), e["rank"].as_u64().unwrap()))
            .collect();
        assert_eq!(ranked, vec![(2, 1), (1, 2), (3, 3)]);

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_validation_failures_return_400() {
        let dir = TempDir::new().unwrap();
        let (app, engine) = start_app(&dir);
        let now = now_ms();

        assert_eq!(post_score(&app, score_body(1, 7, -1, now)).await, StatusCode::BAD_REQUEST);
        assert_eq!(
            post_score(&app, score_body(1, 7, 10, now + 3_600_000)).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(post_score(&app, score_body(0, 7, 10, now)).await, StatusCode::BAD_REQUEST);
        // Missing timestamp is a schema violation.
        assert_eq!(
            post_score(&app, json!({ "userId": 1, "gameId": 7, "score": 10 })).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_window_selection_and_errors() {
        let dir = TempDir::new().unwrap();
        let (app, engine) = start_app(&dir);
        let now = now_ms();

        assert_eq!(post_score(&app, score_body(1, 7, 500, now - 1000)).await, StatusCode::ACCEPTED);
        // Far outside the 24h window: all-time only.
        let old = now - 2 * podium_core::window::DEFAULT_WINDOW_MS;
        assert_eq!(post_score(&app, score_body(2, 7, 600, old)).await, StatusCode::ACCEPTED);

        let (status, body) = get_json(&app, "/api/v1/games/7/leaders?window=24h").await;
        assert_eq!(status, StatusCode::OK);
        let users: Vec<u64> =
            body.as_array().unwrap().iter().map(|e| e["userId"].as_u64().unwrap()).collect();
        assert_eq!(users, vec![1]);

        let (status, body) = get_json(&app, "/api/v1/games/7/leaders").await;
        assert_eq!(status, StatusCode::OK);
        let users: Vec<u64> =
            body.as_array().unwrap().iter().map(|e| e["userId"].as_u64().unwrap()).collect();
        assert_eq!(users, vec![2, 1]);

        // Malformed and unconfigured windows are both 400.
        let (status, _) = get_json(&app, "/api/v1/games/7/leaders?window=24x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(&app, "/api/v1/games/7/leaders?window=7d").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(&app, "/api/v1/games/7/leaders?limit=1001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_user_rank_and_not_found_cases() {
        let dir = TempDir::new().unwrap();
        let (app, engine) = start_app(&dir);
        let base = now_ms() - 10_000;

        for (user_id, score) in [(1u64, 100i64), (2, 200), (3, 300), (4, 400)] {
            assert_eq!(post_score(&app, score_body(user_id, 7, score, base)).await, StatusCode::ACCEPTED);
        }

        let (status, body) = get_json(&app, "/api/v1/games/7/users/4/rank").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], 4);
        assert_eq!(body["rank"], 1);
        assert_eq!(body["score"], 400);
        assert_eq!(body["percentile"], 100.0);

        let (status, body) = get_json(&app, "/api/v1/games/7/users/1/rank").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rank"], 4);
        assert_eq!(body["percentile"], 25.0);

        let (status, _) = get_json(&app, "/api/v1/games/7/users/99/rank").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get_json(&app, "/api/v1/games/42/leaders").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = TempDir::new().unwrap();
        let (app, engine) = start_app(&dir);

        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        engine.shutdown();
    }
}
