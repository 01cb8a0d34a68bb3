//! Snapshot data model
//!
//! A snapshot is the persisted, best-known state for every player seen across
//! all runs to date, keyed by player id.

use crate::extraction::PlayerRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Best-known state for one player
///
/// An entry either carries a numeric record or an error detail from the run
/// that first saw the player fail; `record` is present iff the entry has a
/// numeric efficiency score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub player_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    #[serde(flatten)]
    pub record: Option<PlayerRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl SnapshotEntry {
    /// Entry with a numeric record
    pub fn scored(
        player_id: impl Into<String>,
        owner_name: impl Into<String>,
        record: PlayerRecord,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            owner_name: Some(owner_name.into()),
            record: Some(record),
            error_detail: None,
        }
    }

    /// Entry recording an extraction failure with no known-good baseline
    pub fn errored(player_id: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            owner_name: None,
            record: None,
            error_detail: Some(error_detail.into()),
        }
    }

    /// Whether this entry participates in numeric ranking
    pub fn has_score(&self) -> bool {
        self.record.is_some()
    }

    pub fn efficiency_score(&self) -> Option<i64> {
        self.record.as_ref().map(|r| r.efficiency_score)
    }
}

/// Mapping `player_id -> SnapshotEntry`, iterated in key order so every
/// serialization of the same state is byte-identical
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a list of entries; a duplicate player id keeps
    /// the later entry and logs the collision
    pub fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        let mut snapshot = Self::new();
        for entry in entries {
            if snapshot.entries.contains_key(&entry.player_id) {
                tracing::warn!("Duplicate player id {} in snapshot data", entry.player_id);
            }
            snapshot.insert(entry);
        }
        snapshot
    }

    /// Inserts or overwrites the entry for its player id
    pub fn insert(&mut self, entry: SnapshotEntry) {
        self.entries.insert(entry.player_id.clone(), entry);
    }

    pub fn get(&self, player_id: &str) -> Option<&SnapshotEntry> {
        self.entries.get(player_id)
    }

    /// Entries in ascending player-id order
    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.values()
    }

    pub fn to_entries(&self) -> Vec<SnapshotEntry> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
