//! API server configuration

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use podium_engine::EngineConfig;
use podium_storage::Durability;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub snapshot_interval_ms: u64,
    pub durability: Durability,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PODIUM_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PODIUM_PORT")?,
            wal_path: env::var("WAL_PATH")
                .unwrap_or_else(|_| "./data/wal/scores".to_string())
                .into(),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "./data/snapshot/leaderboard".to_string())
                .into(),
            snapshot_interval_ms: env::var("SNAPSHOT_INTERVAL_MS")
                .unwrap_or_else(|_| "3600000".to_string())
                .parse()
                .context("Invalid SNAPSHOT_INTERVAL_MS")?,
            durability: env::var("WAL_DURABILITY")
                .unwrap_or_else(|_| "flush".to_string())
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid WAL_DURABILITY: {e}"))?,
        })
    }

    /// Engine paths derived from the configured roots: the WAL archive
    /// sits next to the active log, the snapshot temp next to the
    /// snapshot.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            wal_path: self.wal_path.clone(),
            wal_archive_path: sibling(&self.wal_path, "archive"),
            snapshot_path: self.snapshot_path.clone(),
            snapshot_tmp_path: sibling(&self.snapshot_path, "tmp"),
            durability: self.durability,
            snapshot_interval: Duration::from_millis(self.snapshot_interval_ms),
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
