//! Interval-triggered snapshot thread.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::manager::LeaderboardManager;

/// Wakes every `interval` and asks the manager for a snapshot pass.
///
/// The wait sits on a condvar so `stop` interrupts it immediately; the
/// manager's internal pass lock keeps an in-flight interval snapshot and
/// the final shutdown snapshot from overlapping.
pub struct Snapshotter {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Snapshotter {
    pub fn spawn(manager: Arc<LeaderboardManager>, interval: Duration) -> Self {
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("snapshotter".to_string())
            .spawn(move || {
                tracing::debug!(?interval, "Snapshotter started");
                loop {
                    {
                        let (stopped, cvar) = &*thread_stop;
                        let mut stopped = stopped.lock();
                        if !*stopped {
                            cvar.wait_for(&mut stopped, interval);
                        }
                        if *stopped {
                            break;
                        }
                    }
                    // Snapshot failures are operational errors; ingest
                    // continues against the previous snapshot + WAL.
                    if let Err(e) = manager.snapshot() {
                        tracing::error!(error = %e, "Interval snapshot failed");
                    }
                }
                tracing::debug!("Snapshotter exited");
            })
            .expect("Failed to spawn snapshotter thread");

        Self { stop, handle: Some(handle) }
    }

    /// Signal the timer thread and join it. Any snapshot already in
    /// flight completes first.
    pub fn stop(mut self) {
        let (stopped, cvar) = &*self.stop;
        *stopped.lock() = true;
        cvar.notify_all();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
        tracing::debug!("Snapshotter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::EngineConfig;
    use crate::time::now_ms;
    use podium_core::ScoreEntry;
    use podium_storage::Durability;
    use podium_storage::snapshot::read_snapshot;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, interval: Duration) -> EngineConfig {
        EngineConfig {
            wal_path: dir.path().join("wal/scores"),
            wal_archive_path: dir.path().join("wal/scores.archive"),
            snapshot_path: dir.path().join("snapshot/leaderboard"),
            snapshot_tmp_path: dir.path().join("snapshot/leaderboard.tmp"),
            durability: Durability::Flush,
            snapshot_interval: interval,
        }
    }

    #[test]
    fn test_interval_snapshot_is_written() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, Duration::from_millis(50));
        let manager = Arc::new(LeaderboardManager::recover(config.clone()).unwrap());
        manager.record_score(ScoreEntry::new(1, 7, 100, now_ms())).unwrap();

        let snapshotter = Snapshotter::spawn(Arc::clone(&manager), config.snapshot_interval);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while std::time::Instant::now() < deadline && !config.snapshot_path.exists() {
            thread::sleep(Duration::from_millis(10));
        }
        snapshotter.stop();

        let snap = read_snapshot(&config.snapshot_path).unwrap().unwrap();
        assert_eq!(snap.games.len(), 1);
        assert_eq!(snap.games[0].all_time.len(), 1);
    }

    #[test]
    fn test_stop_interrupts_long_interval() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, Duration::from_secs(3600));
        let manager = Arc::new(LeaderboardManager::recover(config).unwrap());

        let snapshotter = Snapshotter::spawn(manager, Duration::from_secs(3600));
        let start = std::time::Instant::now();
        snapshotter.stop();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
