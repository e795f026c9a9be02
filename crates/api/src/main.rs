//! Podium REST API server

use std::net::SocketAddr;

use tokio::signal;

mod config;
mod error;
mod logging;
mod routes;
mod state;

use config::Config;
use podium_engine::Engine;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize logging (JSON in production, pretty in development)
    let is_production = logging::is_production();
    logging::init_logging(is_production);

    tracing::info!(production = is_production, "Starting Podium API server");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        wal = ?config.wal_path,
        snapshot = ?config.snapshot_path,
        durability = ?config.durability,
        "Configuration loaded"
    );

    // Recover persisted state and start the background threads. A corrupt
    // WAL or snapshot refuses startup here.
    let engine = Engine::start(config.engine_config())?;
    let state = AppState::new(&engine);

    // Build router
    let app = routes::create_router(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(address = %addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    // Stop the workers and write the final snapshot.
    engine.shutdown();

    tracing::info!("API server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
