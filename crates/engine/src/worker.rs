//! Background removal of expired window entries.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use podium_core::GameLeaderboardSet;

use crate::queue::ExpirationQueue;

/// Dedicated thread that drains due expiration tickets and removes the
/// referenced entries from their windowed views.
///
/// Removal is by full-entry equality, so a ticket whose entry has been
/// superseded since it was enqueued does nothing.
pub struct ExpirationWorker {
    queue: Arc<ExpirationQueue>,
    done: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ExpirationWorker {
    pub fn spawn(
        queue: Arc<ExpirationQueue>,
        games: Arc<DashMap<u64, Arc<GameLeaderboardSet>>>,
    ) -> Self {
        let done = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_queue = Arc::clone(&queue);
        let thread_done = Arc::clone(&done);

        let handle = thread::Builder::new()
            .name("expiration-worker".to_string())
            .spawn(move || {
                tracing::debug!("Expiration worker started");
                Self::run(&thread_queue, &games);
                let (finished, cvar) = &*thread_done;
                *finished.lock() = true;
                cvar.notify_all();
                tracing::debug!("Expiration worker exited");
            })
            .expect("Failed to spawn expiration worker thread");

        Self { queue, done, handle: Some(handle) }
    }

    fn run(queue: &ExpirationQueue, games: &DashMap<u64, Arc<GameLeaderboardSet>>) {
        while let Some(ticket) = queue.take() {
            let Some(set) = games.get(&ticket.game_id).map(|slot| Arc::clone(slot.value()))
            else {
                continue;
            };
            let Some(view) = set.get_view(Some(&ticket.window_key)) else { continue };
            view.remove(&ticket.entry);
            tracing::trace!(
                game_id = ticket.game_id,
                user_id = ticket.entry.user_id,
                window = %ticket.window_key,
                "Expired window entry"
            );
        }
    }

    /// Close the queue and wait up to `timeout` for the worker to drain
    /// out. Past the deadline the thread is abandoned; the queue is
    /// already closed so it can take nothing further.
    pub fn stop(mut self, timeout: Duration) {
        self.queue.close();

        let (finished, cvar) = &*self.done;
        let mut is_done = finished.lock();
        if !*is_done {
            cvar.wait_for(&mut is_done, timeout);
        }

        if *is_done {
            drop(is_done);
            if let Some(handle) = self.handle.take() {
                handle.join().ok();
            }
            tracing::debug!("Expiration worker stopped");
        } else {
            tracing::warn!(?timeout, "Expiration worker did not stop in time, abandoning");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now_ms;
    use podium_core::ScoreEntry;

    fn spawn_fixture() -> (Arc<ExpirationQueue>, Arc<DashMap<u64, Arc<GameLeaderboardSet>>>, ExpirationWorker)
    {
        let queue = Arc::new(ExpirationQueue::new());
        let games: Arc<DashMap<u64, Arc<GameLeaderboardSet>>> = Arc::new(DashMap::new());
        let worker = ExpirationWorker::spawn(Arc::clone(&queue), Arc::clone(&games));
        (queue, games, worker)
    }

    fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        check()
    }

    #[test]
    fn test_due_ticket_removes_windowed_entry_only() {
        let (queue, games, worker) = spawn_fixture();
        let set = Arc::new(GameLeaderboardSet::new(7));
        games.insert(7, Arc::clone(&set));

        // An entry most of the way through the 24h window: due shortly.
        let age_ms = podium_core::window::DEFAULT_WINDOW_MS - 100;
        let entry = ScoreEntry::new(1, 7, 500, now_ms() - age_ms);
        set.apply(entry, now_ms(), |ticket| queue.push(ticket));

        let windowed = set.get_view(Some("24h")).unwrap();
        assert_eq!(windowed.len(), 1);

        assert!(wait_until(Duration::from_secs(2), || windowed.user_score(1).is_none()));
        // The all-time view is untouched.
        assert_eq!(set.all_time().user_rank(1), Some(1));

        worker.stop(Duration::from_secs(5));
    }

    #[test]
    fn test_superseded_entry_survives_stale_ticket() {
        let (queue, games, worker) = spawn_fixture();
        let set = Arc::new(GameLeaderboardSet::new(7));
        games.insert(7, Arc::clone(&set));

        let age_ms = podium_core::window::DEFAULT_WINDOW_MS - 100;
        let old = ScoreEntry::new(1, 7, 500, now_ms() - age_ms);
        set.apply(old, now_ms(), |ticket| queue.push(ticket));

        // Resubmission: the old entry's ticket must not touch this one.
        let newer = ScoreEntry::new(1, 7, 300, now_ms() - 1000);
        set.apply(newer, now_ms(), |ticket| queue.push(ticket));

        // Wait for the stale ticket to fire; the newer entry's own
        // far-future ticket stays queued.
        let windowed = set.get_view(Some("24h")).unwrap();
        assert!(wait_until(Duration::from_secs(2), || queue.len() == 1));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(windowed.user_score(1), Some(newer));

        worker.stop(Duration::from_secs(5));
    }

    #[test]
    fn test_ticket_for_unknown_game_is_ignored() {
        let (queue, _games, worker) = spawn_fixture();
        queue.push(podium_core::ExpirationTicket {
            due_at_ms: now_ms() - 1,
            game_id: 999,
            window_key: "24h".to_string(),
            entry: ScoreEntry::new(1, 999, 1, 0),
        });

        assert!(wait_until(Duration::from_secs(2), || queue.is_empty()));
        worker.stop(Duration::from_secs(5));
    }

    #[test]
    fn test_stop_returns_promptly_when_idle() {
        let (_queue, _games, worker) = spawn_fixture();
        let start = std::time::Instant::now();
        worker.stop(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
