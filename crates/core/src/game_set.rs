//! Per-game container of ranking views.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::board::Leaderboard;
use crate::entry::ScoreEntry;
use crate::window::{DEFAULT_WINDOW_KEY, DEFAULT_WINDOW_MS};

/// Request to drop an entry from a windowed view once its window elapses.
///
/// The ticket carries a copy of the entry; it is matched against the view
/// by full-field equality, so a ticket whose entry has been superseded is
/// inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationTicket {
    /// Wall-clock instant (ms since epoch) the entry leaves the window
    pub due_at_ms: i64,
    pub game_id: u64,
    pub window_key: String,
    pub entry: ScoreEntry,
}

#[derive(Debug)]
struct WindowedView {
    duration_ms: i64,
    board: Arc<Leaderboard>,
}

/// All ranking views of one game: the all-time board plus any configured
/// sliding windows.
///
/// The set never references the expiration machinery. `apply` hands
/// tickets to a caller-supplied callback, so ownership stays one-way and
/// snapshots have nothing transient to skip.
#[derive(Debug)]
pub struct GameLeaderboardSet {
    game_id: u64,
    all_time: Arc<Leaderboard>,
    windows: RwLock<HashMap<String, WindowedView>>,
}

impl GameLeaderboardSet {
    /// Create a set with the default `24h` window configured.
    pub fn new(game_id: u64) -> Self {
        let set = Self {
            game_id,
            all_time: Arc::new(Leaderboard::new()),
            windows: RwLock::new(HashMap::new()),
        };
        set.configure_window(DEFAULT_WINDOW_KEY, DEFAULT_WINDOW_MS);
        set
    }

    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    /// Configure (or reconfigure) a window. Idempotent: an existing board
    /// is kept, the duration is always rebound.
    pub fn configure_window(&self, key: &str, duration_ms: i64) {
        let mut windows = self.windows.write();
        windows
            .entry(key.to_string())
            .and_modify(|view| view.duration_ms = duration_ms)
            .or_insert_with(|| WindowedView {
                duration_ms,
                board: Arc::new(Leaderboard::new()),
            });
    }

    /// Resolve a view. `None` or the empty string selects the all-time
    /// board; otherwise the configured window, or `None` if unconfigured.
    pub fn get_view(&self, window_key: Option<&str>) -> Option<Arc<Leaderboard>> {
        match window_key {
            None | Some("") => Some(Arc::clone(&self.all_time)),
            Some(key) => self.windows.read().get(key).map(|view| Arc::clone(&view.board)),
        }
    }

    /// The all-time view. Never window-evicted.
    pub fn all_time(&self) -> Arc<Leaderboard> {
        Arc::clone(&self.all_time)
    }

    /// The configured `window key -> duration_ms` table.
    pub fn window_configs(&self) -> Vec<(String, i64)> {
        self.windows.read().iter().map(|(key, view)| (key.clone(), view.duration_ms)).collect()
    }

    /// Every windowed view with its key and duration. Used by the
    /// snapshotter and by ticket reconstruction on load.
    pub fn window_views(&self) -> Vec<(String, i64, Arc<Leaderboard>)> {
        self.windows
            .read()
            .iter()
            .map(|(key, view)| (key.clone(), view.duration_ms, Arc::clone(&view.board)))
            .collect()
    }

    /// Apply a score to the all-time view and to every window it falls in.
    ///
    /// `now_ms` is sampled once by the caller so the in-window decision is
    /// coherent across all windows. Each windowed insert emits one
    /// expiration ticket due at `timestamp_ms + duration`.
    pub fn apply<F>(&self, entry: ScoreEntry, now_ms: i64, mut emit_ticket: F)
    where
        F: FnMut(ExpirationTicket),
    {
        self.all_time.add_or_update(entry);

        let windows = self.windows.read();
        for (key, view) in windows.iter() {
            if entry.timestamp_ms > now_ms - view.duration_ms {
                view.board.add_or_update(entry);
                emit_ticket(ExpirationTicket {
                    due_at_ms: entry.timestamp_ms + view.duration_ms,
                    game_id: self.game_id,
                    window_key: key.clone(),
                    entry,
                });
            }
        }
    }
}
