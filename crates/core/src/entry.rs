//! Score entries and their total ordering.

use std::cmp::Ordering;

/// A single submitted score. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Submitting user
    pub user_id: u64,
    /// Game the score belongs to
    pub game_id: u64,
    /// Score value (non-negative; validated at ingest)
    pub score: i64,
    /// Submission time, milliseconds since the Unix epoch
    pub timestamp_ms: i64,
}

impl ScoreEntry {
    pub fn new(user_id: u64, game_id: u64, score: i64, timestamp_ms: i64) -> Self {
        Self { user_id, game_id, score, timestamp_ms }
    }

    /// Key under which this entry sorts in a ranking board.
    pub fn sort_key(&self) -> SortKey {
        SortKey { score: self.score, timestamp_ms: self.timestamp_ms, user_id: self.user_id }
    }
}

/// Ranking order: higher score first, earlier submission wins ties, and
/// user id as the final tiebreak so the ordering is strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub score: i64,
    pub timestamp_ms: i64,
    pub user_id: u64,
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.timestamp_ms.cmp(&other.timestamp_ms))
            .then_with(|| self.user_id.cmp(&other.user_id))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_higher_score_sorts_first() {
        let a = ScoreEntry::new(1, 7, 200, 1000).sort_key();
        let b = ScoreEntry::new(2, 7, 100, 1000).sort_key();
        assert!(a < b);
    }

    #[test]
    fn test_earlier_timestamp_wins_tie() {
        let earlier = ScoreEntry::new(1, 7, 100, 999).sort_key();
        let later = ScoreEntry::new(2, 7, 100, 1000).sort_key();
        assert!(earlier < later);
    }

    #[test]
    fn test_user_id_breaks_full_tie() {
        let a = ScoreEntry::new(1, 7, 100, 1000).sort_key();
        let b = ScoreEntry::new(3, 7, 100, 1000).sort_key();
        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_identical_entries_compare_equal() {
        let a = ScoreEntry::new(1, 7, 100, 1000).sort_key();
        let b = ScoreEntry::new(1, 7, 100, 1000).sort_key();
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }
}
