//! A single ranking view: sorted index plus user map.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::entry::{ScoreEntry, SortKey};

/// One leaderboard view (all-time or windowed).
///
/// Holds at most one entry per user. The sorted index and the user map are
/// mutated under a single write guard, so readers always observe a
/// consistent pairing: a user is bound in the map iff exactly one entry
/// with that user id is present in the sorted index.
#[derive(Debug, Default)]
pub struct Leaderboard {
    inner: RwLock<BoardInner>,
}

#[derive(Debug, Default)]
struct BoardInner {
    sorted: BTreeMap<SortKey, ScoreEntry>,
    by_user: HashMap<u64, ScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry`, replacing any previous entry for the same user.
    ///
    /// Last submission wins: no comparison against the previous score is
    /// made. The superseded entry leaves the sorted index in the same
    /// critical section.
    pub fn add_or_update(&self, entry: ScoreEntry) {
        let mut inner = self.inner.write();
        if let Some(prev) = inner.by_user.insert(entry.user_id, entry) {
            inner.sorted.remove(&prev.sort_key());
        }
        inner.sorted.insert(entry.sort_key(), entry);
    }

    /// Remove `entry` by full-field equality.
    ///
    /// The user binding is only cleared when it still points at `entry`,
    /// so removing a superseded entry is harmless. Absent entries are
    /// silently ignored.
    pub fn remove(&self, entry: &ScoreEntry) {
        let mut inner = self.inner.write();
        inner.sorted.remove(&entry.sort_key());
        if inner.by_user.get(&entry.user_id) == Some(entry) {
            inner.by_user.remove(&entry.user_id);
        }
    }

    /// First `min(k, len)` entries in rank order.
    pub fn top_k(&self, k: usize) -> Vec<ScoreEntry> {
        let inner = self.inner.read();
        inner.sorted.values().take(k).copied().collect()
    }

    /// The entry currently bound for `user_id`, if any.
    pub fn user_score(&self, user_id: u64) -> Option<ScoreEntry> {
        self.inner.read().by_user.get(&user_id).copied()
    }

    /// 1-based rank of `user_id`, or `None` if the user is not in this view.
    ///
    /// Walks the sorted index up to the user's position (O(rank)). Views
    /// large enough to make this hurt would move to an order-statistic
    /// index; ranking correctness does not depend on it.
    pub fn user_rank(&self, user_id: u64) -> Option<usize> {
        let inner = self.inner.read();
        let key = inner.by_user.get(&user_id)?.sort_key();
        inner.sorted.keys().position(|k| *k == key).map(|pos| pos + 1)
    }

    /// Number of entries in the view.
    pub fn len(&self) -> usize {
        self.inner.read().sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sorted.is_empty()
    }

    /// All entries in rank order, cloned under a single read guard.
    ///
    /// Used by the snapshotter to image the view consistently.
    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.inner.read().sorted.values().copied().collect()
    }

    #[cfg(test)]
    fn invariants_hold(&self) -> bool {
        let inner = self.inner.read();
        inner.sorted.len() == inner.by_user.len()
            && inner
                .sorted
                .values()
                .all(|e| inner.by_user.get(&e.user_id) == Some(e))
    }
}

/// Percentile of a 1-based `rank` within `total` entries.
///
/// Rank 1 of a 100-player view is 100.0; the last rank is 1.0. An empty
/// view yields 0.0.
pub fn percentile(rank: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((total - rank + 1) as f64 * 100.0) / total as f64
}
