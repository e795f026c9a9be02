//! Podium engine
//!
//! Ties the core ranking structures to the persistence layer and runs the
//! two background threads (window expiration, interval snapshots). The
//! engine is fully usable without the HTTP surface.

pub mod error;
pub mod manager;
pub mod queue;
pub mod runtime;
pub mod service;
pub mod snapshotter;
pub mod time;
pub mod worker;

pub use error::EngineError;
pub use manager::{EngineConfig, LeaderboardManager};
pub use queue::ExpirationQueue;
pub use runtime::Engine;
pub use service::{RankedEntry, ScoreService, UserRankInfo};
