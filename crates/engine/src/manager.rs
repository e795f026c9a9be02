//! Top-level engine facade: game map, WAL-first ingest, snapshots,
//! startup recovery.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use podium_core::{ExpirationTicket, GameLeaderboardSet, ScoreEntry};
use podium_storage::snapshot::{self, SnapshotData, SnapshotGame, WindowSnapshot};
use podium_storage::{Durability, WriteAheadLog};

use crate::error::EngineError;
use crate::queue::ExpirationQueue;
use crate::time::now_ms;

/// Where persisted state lives and how often it is snapshotted.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub wal_path: PathBuf,
    pub wal_archive_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub snapshot_tmp_path: PathBuf,
    pub durability: Durability,
    pub snapshot_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("./data/wal/scores"),
            wal_archive_path: PathBuf::from("./data/wal/scores.archive"),
            snapshot_path: PathBuf::from("./data/snapshot/leaderboard"),
            snapshot_tmp_path: PathBuf::from("./data/snapshot/leaderboard.tmp"),
            durability: Durability::default(),
            snapshot_interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Owns every game's leaderboard set, the expiration queue, and the WAL.
///
/// Ingest discipline: append to the WAL first, then mutate memory, so a
/// failed append never leaves a score visible that recovery cannot
/// reproduce. An ingest gate (read side: ingest, write side: snapshot
/// pass) guarantees that every record rotated out of the WAL is covered
/// by the snapshot that triggered the rotation.
pub struct LeaderboardManager {
    games: Arc<DashMap<u64, Arc<GameLeaderboardSet>>>,
    queue: Arc<ExpirationQueue>,
    wal: WriteAheadLog,
    config: EngineConfig,
    ingest_gate: RwLock<()>,
    snapshot_pass: Mutex<()>,
}

impl LeaderboardManager {
    /// Open the WAL, load the snapshot if one exists, and replay the
    /// active log on top. Corrupt state refuses to start.
    pub fn recover(config: EngineConfig) -> Result<Self, EngineError> {
        let wal = WriteAheadLog::open(&config.wal_path, config.durability)?;
        let manager = Self {
            games: Arc::new(DashMap::new()),
            queue: Arc::new(ExpirationQueue::new()),
            wal,
            config,
            ingest_gate: RwLock::new(()),
            snapshot_pass: Mutex::new(()),
        };

        if let Some(snap) = snapshot::read_snapshot(&manager.config.snapshot_path)? {
            let game_count = snap.games.len();
            let mut restored = 0usize;
            for game in snap.games {
                restored += manager.restore_game(game);
            }
            tracing::info!(
                games = game_count,
                entries = restored,
                last_included_timestamp_ms = snap.last_included_timestamp_ms,
                "Snapshot loaded"
            );
        }

        // The WAL is rotated in the same exclusive section the snapshot
        // is written in, so every record in the active log postdates the
        // snapshot; the whole log is replayed. Filtering on the
        // snapshot's last_included instant would drop records whose
        // caller-supplied timestamps lag the snapshot wall-clock.
        let replayed = manager.wal.replay(i64::MIN, |entry| manager.apply_entry(entry))?;
        tracing::info!(records = replayed, "WAL replay complete");
        Ok(manager)
    }

    /// Rebuild one game from its snapshot image, re-emitting expiration
    /// tickets for every windowed entry (the queue is never persisted).
    /// Returns the number of all-time entries restored.
    fn restore_game(&self, game: SnapshotGame) -> usize {
        let set = Arc::new(GameLeaderboardSet::new(game.game_id));
        for window in &game.windows {
            set.configure_window(&window.key, window.duration_ms);
        }

        let all_time = set.all_time();
        let restored = game.all_time.len();
        for entry in game.all_time {
            all_time.add_or_update(entry);
        }

        for window in game.windows {
            let Some(board) = set.get_view(Some(&window.key)) else { continue };
            for entry in window.entries {
                board.add_or_update(entry);
                // Entries whose window has already elapsed get a past-due
                // ticket and are removed as soon as the worker starts.
                self.queue.push(ExpirationTicket {
                    due_at_ms: entry.timestamp_ms + window.duration_ms,
                    game_id: game.game_id,
                    window_key: window.key.clone(),
                    entry,
                });
            }
        }

        self.games.insert(game.game_id, set);
        restored
    }

    /// Durably log and apply one score. The in-memory update is visible
    /// to readers before this returns; WAL failure aborts the ingest
    /// with no in-memory effect.
    pub fn record_score(&self, entry: ScoreEntry) -> Result<(), EngineError> {
        let _gate = self.ingest_gate.read();
        self.wal.append(&entry)?;
        self.apply_entry(entry);
        Ok(())
    }

    /// Apply without logging. Used for live ingest (after the append)
    /// and for WAL replay. Window eligibility is always judged against
    /// the wall-clock at apply time.
    fn apply_entry(&self, entry: ScoreEntry) {
        let set = {
            let slot = self
                .games
                .entry(entry.game_id)
                .or_insert_with(|| Arc::new(GameLeaderboardSet::new(entry.game_id)));
            Arc::clone(slot.value())
        };
        set.apply(entry, now_ms(), |ticket| self.queue.push(ticket));
    }

    pub fn get_game_set(&self, game_id: u64) -> Option<Arc<GameLeaderboardSet>> {
        self.games.get(&game_id).map(|slot| Arc::clone(slot.value()))
    }

    /// Image all games, write the snapshot atomically, then rotate the
    /// WAL. Ingest is excluded for the duration of the pass; concurrent
    /// interval/shutdown passes are serialized.
    ///
    /// A failure leaves the previous snapshot and the active WAL intact.
    pub fn snapshot(&self) -> Result<(), EngineError> {
        let _pass = self.snapshot_pass.lock();
        let _gate = self.ingest_gate.write();

        let last_included_timestamp_ms = now_ms();
        let mut games: Vec<SnapshotGame> = self
            .games
            .iter()
            .map(|slot| {
                let set = slot.value();
                SnapshotGame {
                    game_id: set.game_id(),
                    all_time: set.all_time().entries(),
                    windows: set
                        .window_views()
                        .into_iter()
                        .map(|(key, duration_ms, board)| WindowSnapshot {
                            key,
                            duration_ms,
                            entries: board.entries(),
                        })
                        .collect(),
                }
            })
            .collect();
        games.sort_by_key(|game| game.game_id);
        let entries: usize = games.iter().map(|g| g.all_time.len()).sum();

        snapshot::write_snapshot(
            &self.config.snapshot_path,
            &self.config.snapshot_tmp_path,
            &SnapshotData { last_included_timestamp_ms, games },
        )?;
        self.wal.rotate(&self.config.wal_archive_path)?;

        tracing::info!(entries, last_included_timestamp_ms, "Snapshot written, WAL rotated");
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the game map, for the expiration worker.
    pub(crate) fn games_handle(&self) -> Arc<DashMap<u64, Arc<GameLeaderboardSet>>> {
        Arc::clone(&self.games)
    }

    /// Shared handle to the expiration queue.
    pub fn queue_handle(&self) -> Arc<ExpirationQueue> {
        Arc::clone(&self.queue)
    }
}
