//! Engine lifecycle: startup recovery, background threads, shutdown.

use std::sync::Arc;
use std::time::Duration;

use crate::error::EngineError;
use crate::manager::{EngineConfig, LeaderboardManager};
use crate::snapshotter::Snapshotter;
use crate::worker::ExpirationWorker;

/// Bound on how long shutdown waits for the expiration worker.
const WORKER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// A fully started engine: recovered state plus the expiration worker
/// and snapshot timer threads.
pub struct Engine {
    manager: Arc<LeaderboardManager>,
    worker: ExpirationWorker,
    snapshotter: Snapshotter,
}

impl Engine {
    /// Recover persisted state and start the background threads.
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let interval = config.snapshot_interval;
        let manager = Arc::new(LeaderboardManager::recover(config)?);
        let worker = ExpirationWorker::spawn(manager.queue_handle(), manager.games_handle());
        let snapshotter = Snapshotter::spawn(Arc::clone(&manager), interval);
        tracing::info!("Engine started");
        Ok(Self { manager, worker, snapshotter })
    }

    pub fn manager(&self) -> Arc<LeaderboardManager> {
        Arc::clone(&self.manager)
    }

    /// Graceful shutdown: stop the timer, stop the worker (bounded),
    /// then write the final snapshot. The WAL closes when the manager
    /// drops.
    pub fn shutdown(self) {
        tracing::info!("Engine shutting down");
        self.snapshotter.stop();
        self.worker.stop(WORKER_STOP_TIMEOUT);
        match self.manager.snapshot() {
            Ok(()) => tracing::info!("Final snapshot written"),
            Err(e) => tracing::error!(error = %e, "Final snapshot failed"),
        }
    }
}
