//! Versioned binary snapshot of all ranking views.
//!
//! Layout (all integers little-endian):
//!
//! - magic: `PDSN` (4)
//! - schema version: u16
//! - last_included_timestamp_ms: i64
//! - game count: u32, then per game:
//!   - game_id: u64
//!   - all-time entry count: u32, then 32-byte entry records
//!   - window count: u32, then per window:
//!     - key length: u16 + key bytes (UTF-8)
//!     - duration_ms: i64
//!     - entry count: u32, then 32-byte entry records
//!
//! Entry record (32 bytes): user_id u64, game_id u64, score i64,
//! timestamp_ms i64.
//!
//! The file is written to a temp sibling, flushed and synced, then
//! atomically renamed over the final path; a failed write leaves the
//! previous snapshot untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use podium_core::ScoreEntry;

use crate::error::StorageError;

const MAGIC: [u8; 4] = *b"PDSN";
const VERSION: u16 = 1;

/// Size of one encoded score entry.
const ENTRY_SIZE: usize = 32;

/// One windowed view within a game snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub key: String,
    pub duration_ms: i64,
    pub entries: Vec<ScoreEntry>,
}

/// All views of one game at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotGame {
    pub game_id: u64,
    pub all_time: Vec<ScoreEntry>,
    pub windows: Vec<WindowSnapshot>,
}

/// A complete point-in-time image of the engine's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotData {
    /// WAL records with a timestamp at or after this instant are replayed
    /// on top of the snapshot during recovery.
    pub last_included_timestamp_ms: i64,
    pub games: Vec<SnapshotGame>,
}

/// Write `data` atomically to `path`, staging through `tmp_path`.
pub fn write_snapshot(
    path: &Path,
    tmp_path: &Path,
    data: &SnapshotData,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let result = write_tmp(tmp_path, data).and_then(|()| Ok(fs::rename(tmp_path, path)?));
    if result.is_err() {
        fs::remove_file(tmp_path).ok();
    }
    result
}

fn write_tmp(tmp_path: &Path, data: &SnapshotData) -> Result<(), StorageError> {
    let bytes = encode(data);
    let mut file = File::create(tmp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Read a snapshot back. An absent file is `None`; anything unreadable or
/// failing the magic/version check is `Corrupt`.
pub fn read_snapshot(path: &Path) -> Result<Option<SnapshotData>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode(&bytes).map(Some)
}

fn encode(data: &SnapshotData) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&data.last_included_timestamp_ms.to_le_bytes());
    buf.extend_from_slice(&(data.games.len() as u32).to_le_bytes());

    for game in &data.games {
        buf.extend_from_slice(&game.game_id.to_le_bytes());
        encode_entries(&mut buf, &game.all_time);
        buf.extend_from_slice(&(game.windows.len() as u32).to_le_bytes());
        for window in &game.windows {
            let key = window.key.as_bytes();
            buf.extend_from_slice(&(key.len() as u16).to_le_bytes());
            buf.extend_from_slice(key);
            buf.extend_from_slice(&window.duration_ms.to_le_bytes());
            encode_entries(&mut buf, &window.entries);
        }
    }
    buf
}

fn encode_entries(buf: &mut Vec<u8>, entries: &[ScoreEntry]) {
    buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        buf.extend_from_slice(&entry.user_id.to_le_bytes());
        buf.extend_from_slice(&entry.game_id.to_le_bytes());
        buf.extend_from_slice(&entry.score.to_le_bytes());
        buf.extend_from_slice(&entry.timestamp_ms.to_le_bytes());
    }
}

fn decode(bytes: &[u8]) -> Result<SnapshotData, StorageError> {
    let mut reader = Reader { bytes, pos: 0 };

    let magic = reader.take(4)?;
    if magic != MAGIC {
        return Err(StorageError::Corrupt("bad snapshot magic".to_string()));
    }
    let version = reader.u16()?;
    if version != VERSION {
        return Err(StorageError::Corrupt(format!(
            "unsupported snapshot version {version} (expected {VERSION})"
        )));
    }

    let last_included_timestamp_ms = reader.i64()?;
    let game_count = reader.u32()? as usize;
    let mut games = Vec::with_capacity(game_count);

    for _ in 0..game_count {
        let game_id = reader.u64()?;
        let all_time = decode_entries(&mut reader)?;
        let window_count = reader.u32()? as usize;
        let mut windows = Vec::with_capacity(window_count);
        for _ in 0..window_count {
            let key_len = reader.u16()? as usize;
            let key = std::str::from_utf8(reader.take(key_len)?)
                .map_err(|_| StorageError::Corrupt("window key is not UTF-8".to_string()))?
                .to_string();
            let duration_ms = reader.i64()?;
            let entries = decode_entries(&mut reader)?;
            windows.push(WindowSnapshot { key, duration_ms, entries });
        }
        games.push(SnapshotGame { game_id, all_time, windows });
    }

    if reader.pos != bytes.len() {
        return Err(StorageError::Corrupt("trailing bytes after snapshot".to_string()));
    }
    Ok(SnapshotData { last_included_timestamp_ms, games })
}

fn decode_entries(reader: &mut Reader<'_>) -> Result<Vec<ScoreEntry>, StorageError> {
    let count = reader.u32()? as usize;
    let mut entries = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        let record = reader.take(ENTRY_SIZE)?;
        entries.push(ScoreEntry {
            user_id: u64::from_le_bytes(record[0..8].try_into().unwrap()),
            game_id: u64::from_le_bytes(record[8..16].try_into().unwrap()),
            score: i64::from_le_bytes(record[16..24].try_into().unwrap()),
            timestamp_ms: i64::from_le_bytes(record[24..32].try_into().unwrap()),
        });
    }
    Ok(entries)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], StorageError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| StorageError::Corrupt("truncated snapshot".to_string()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, StorageError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32, StorageError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn u64(&mut self) -> Result<u64, StorageError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64, StorageError> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }
}
