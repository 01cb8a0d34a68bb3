//! Snapshot persistence
//!
//! Two files come out of every run:
//! - the persisted snapshot, the comparison baseline the next run reads back
//! - the display snapshot, the ranked result set plus the transient fields
//!   (URL, annotation, rendered delta) the external renderer shows
//!
//! Both are whole-file JSON overwrites, written to a temp file in the target
//! directory and renamed into place so a crash mid-write never leaves a
//! truncated baseline.

use crate::ranking::RankedEntry;
use crate::snapshot::types::{Snapshot, SnapshotEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur persisting or loading snapshot files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Loads the persisted snapshot from the previous run
///
/// A missing file means no previous run and loads as an empty snapshot; a
/// corrupt or unreadable file is logged and likewise treated as empty, so a
/// damaged baseline degrades deltas to `New` instead of blocking the run.
pub fn load_snapshot(path: &Path) -> Snapshot {
    if !path.exists() {
        tracing::info!("No previous snapshot at {}, starting fresh", path.display());
        return Snapshot::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Could not read previous snapshot {}: {}", path.display(), e);
            return Snapshot::new();
        }
    };

    match serde_json::from_str::<Vec<SnapshotEntry>>(&content) {
        Ok(entries) => {
            tracing::info!("Loaded {} snapshot entries from {}", entries.len(), path.display());
            Snapshot::from_entries(entries)
        }
        Err(e) => {
            tracing::warn!("Previous snapshot {} is corrupt: {}", path.display(), e);
            Snapshot::new()
        }
    }
}

/// Writes the persisted snapshot atomically
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(&snapshot.to_entries())?;
    write_atomically(path, &json)?;
    tracing::info!("Wrote {} snapshot entries to {}", snapshot.len(), path.display());
    Ok(())
}

/// One row of the display snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub player_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,

    #[serde(flatten)]
    pub record: Option<crate::extraction::PlayerRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    /// Rendered movement label: `↑n`, `↓n`, `-`, `New`, or `error`
    pub delta: String,
}

impl DisplayEntry {
    /// Builds a display row from a ranked entry plus this run's target info
    pub fn from_ranked(
        ranked: &RankedEntry,
        url: Option<String>,
        annotation: Option<String>,
    ) -> Self {
        Self {
            player_id: ranked.entry.player_id.clone(),
            owner_name: ranked.entry.owner_name.clone(),
            url,
            annotation,
            record: ranked.entry.record.clone(),
            error_detail: ranked.entry.error_detail.clone(),
            rank: ranked.rank,
            delta: ranked.delta.to_string(),
        }
    }
}

/// The full display file: ranked rows plus the run timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub results: Vec<DisplayEntry>,
    pub last_updated: String,
}

/// Writes the display snapshot atomically
pub fn save_display(path: &Path, display: &DisplaySnapshot) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(display)?;
    write_atomically(path, &json)?;
    let row_count = display.results.len();
    tracing::info!("Wrote {} display rows to {}", row_count, path.display());
    Ok(())
}

fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PlayerRecord;
    use crate::ranking::DeltaLabel;
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(SnapshotEntry::scored(
            "11",
            "RedDragon",
            PlayerRecord::from_counts(10, 2, 3),
        ));
        snapshot.insert(SnapshotEntry::errored("22", "navigate: timed out"));
        snapshot
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");

        let snapshot = sample_snapshot();
        save_snapshot(&path, &snapshot).unwrap();

        let loaded = load_snapshot(&path);
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_missing_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = load_snapshot(&dir.path().join("absent.json"));
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded = load_snapshot(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_overwrites_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");

        save_snapshot(&path, &sample_snapshot()).unwrap();
        save_snapshot(&path, &Snapshot::new()).unwrap();

        assert!(load_snapshot(&path).is_empty());
    }

    #[test]
    fn test_display_snapshot_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("display.json");

        let ranked = RankedEntry {
            entry: SnapshotEntry::scored("11", "RedDragon", PlayerRecord::from_counts(10, 2, 3)),
            rank: Some(1),
            delta: DeltaLabel::Up(2),
        };
        let display = DisplaySnapshot {
            results: vec![DisplayEntry::from_ranked(
                &ranked,
                Some("https://site.example/popup/11".to_string()),
                Some("top seed".to_string()),
            )],
            last_updated: "2025-07-01 12:00:00".to_string(),
        };

        save_display(&path, &display).unwrap();

        let loaded: DisplaySnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, display);
        assert_eq!(loaded.results[0].delta, "↑2");
    }
}
