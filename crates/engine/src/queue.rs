//! Delay-ordered queue of expiration tickets.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use podium_core::ExpirationTicket;

use crate::time::now_ms;

/// Heap item ordered by due time; a sequence number keeps the ordering
/// strict and FIFO among tickets due at the same instant.
struct QueuedTicket {
    due_at_ms: i64,
    seq: u64,
    ticket: ExpirationTicket,
}

impl PartialEq for QueuedTicket {
    fn eq(&self, other: &Self) -> bool {
        self.due_at_ms == other.due_at_ms && self.seq == other.seq
    }
}

impl Eq for QueuedTicket {}

impl Ord for QueuedTicket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_at_ms.cmp(&other.due_at_ms).then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for QueuedTicket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<QueuedTicket>>,
    next_seq: u64,
    closed: bool,
}

/// Min-priority queue keyed by `due_at_ms` with a blocking take.
///
/// `take` parks the caller until the head ticket is due; a push with an
/// earlier due time wakes it so the new head is re-evaluated. `close`
/// drains all blocked takers with `None`, which is the worker's stop
/// signal.
#[derive(Default)]
pub struct ExpirationQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl ExpirationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a ticket. Ignored after `close`.
    pub fn push(&self, ticket: ExpirationTicket) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Reverse(QueuedTicket { due_at_ms: ticket.due_at_ms, seq, ticket }));
        // Wake the taker even when the head did not change; it just
        // recomputes its deadline and parks again.
        self.available.notify_one();
    }

    /// Block until the head ticket is due, then pop it. Returns `None`
    /// once the queue has been closed.
    pub fn take(&self) -> Option<ExpirationTicket> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            let head_due_ms = state.heap.peek().map(|Reverse(item)| item.due_at_ms);
            match head_due_ms {
                None => {
                    self.available.wait(&mut state);
                }
                Some(due_at_ms) => {
                    let wait_ms = due_at_ms - now_ms();
                    if wait_ms <= 0 {
                        let Reverse(item) = state.heap.pop()?;
                        return Some(item.ticket);
                    }
                    let deadline = Instant::now() + Duration::from_millis(wait_ms as u64);
                    let _ = self.available.wait_until(&mut state, deadline);
                }
            }
        }
    }

    /// Close the queue: pending and future pushes are dropped and every
    /// blocked `take` returns `None`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.heap.clear();
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }
}
