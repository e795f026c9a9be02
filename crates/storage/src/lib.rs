//! Persistence layer for Podium
//!
//! Two durable artifacts, kept side by side:
//!
//! - a textual append-only write-ahead log of every accepted score, and
//! - a versioned binary snapshot of all in-memory views, rewritten
//!   periodically and on shutdown, after which the log is rotated.
//!
//! Recovery loads the snapshot (if any) and replays the active log on top.

pub mod error;
pub mod snapshot;
pub mod wal;

pub use error::StorageError;
pub use snapshot::{SnapshotData, SnapshotGame, WindowSnapshot};
pub use wal::{Durability, WriteAheadLog};
