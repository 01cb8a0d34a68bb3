//! Ranking and delta engine
//!
//! Pure functions from a snapshot to a ranked result set. Ranking is a total
//! order — efficiency score descending, player id ascending on ties — so the
//! same snapshot always produces the same ranks. Deltas compare each player's
//! new rank against a rank map derived the same way from the prior snapshot.

use crate::snapshot::{Snapshot, SnapshotEntry};
use std::collections::HashMap;

/// Rank movement relative to the previous run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaLabel {
    /// Moved up the board by n places
    Up(u32),
    /// Moved down the board by n places
    Down(u32),
    Unchanged,
    /// Not present in the previous rank map
    New,
    /// No numeric score; excluded from ranking
    Errored,
}

impl std::fmt::Display for DeltaLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up(n) => write!(f, "↑{}", n),
            Self::Down(n) => write!(f, "↓{}", n),
            Self::Unchanged => write!(f, "-"),
            Self::New => write!(f, "New"),
            Self::Errored => write!(f, "error"),
        }
    }
}

/// A snapshot entry with its rank assignment and movement label
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub entry: SnapshotEntry,

    /// Dense rank `1..k`; None for entries without a numeric score
    pub rank: Option<u32>,

    pub delta: DeltaLabel,
}

/// Scored entries in ranking order: efficiency descending, then player id
/// ascending (lexicographic) so exact ties still order deterministically
fn ranking_order(snapshot: &Snapshot) -> Vec<&SnapshotEntry> {
    let mut scored: Vec<&SnapshotEntry> = snapshot.iter().filter(|e| e.has_score()).collect();
    scored.sort_by(|a, b| {
        b.efficiency_score()
            .cmp(&a.efficiency_score())
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    scored
}

/// Computes `player_id -> rank` for the scored entries of a snapshot
///
/// This is how the previous run's ranking is reconstructed for delta
/// comparison, so it must sort exactly like [`rank`].
pub fn rank_map(snapshot: &Snapshot) -> HashMap<String, u32> {
    ranking_order(snapshot)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| (entry.player_id.clone(), i as u32 + 1))
        .collect()
}

/// Ranks a snapshot and annotates each entry with its movement
///
/// Scored entries come first in rank order; entries without a numeric score
/// follow in player-id order with `rank = None` and `delta = Errored`.
pub fn rank(snapshot: &Snapshot, previous_ranks: &HashMap<String, u32>) -> Vec<RankedEntry> {
    let mut ranked = Vec::with_capacity(snapshot.len());

    for (i, entry) in ranking_order(snapshot).into_iter().enumerate() {
        let new_rank = i as u32 + 1;
        let delta = match previous_ranks.get(&entry.player_id) {
            Some(&prev) if prev > new_rank => DeltaLabel::Up(prev - new_rank),
            Some(&prev) if prev < new_rank => DeltaLabel::Down(new_rank - prev),
            Some(_) => DeltaLabel::Unchanged,
            None => DeltaLabel::New,
        };

        ranked.push(RankedEntry {
            entry: entry.clone(),
            rank: Some(new_rank),
            delta,
        });
    }

    // Snapshot iteration is already player-id ordered
    for entry in snapshot.iter().filter(|e| !e.has_score()) {
        ranked.push(RankedEntry {
            entry: entry.clone(),
            rank: None,
            delta: DeltaLabel::Errored,
        });
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PlayerRecord;

    fn scored(id: &str, wins: u32, losses: u32) -> SnapshotEntry {
        SnapshotEntry::scored(id, format!("owner-{}", id), PlayerRecord::from_counts(wins, 0, losses))
    }

    fn snapshot_of(entries: Vec<SnapshotEntry>) -> Snapshot {
        Snapshot::from_entries(entries)
    }

    #[test]
    fn test_dense_ranks_in_score_order() {
        let snapshot = snapshot_of(vec![scored("a", 1, 0), scored("b", 5, 0), scored("c", 3, 0)]);

        let ranked = rank(&snapshot, &HashMap::new());

        let order: Vec<_> = ranked
            .iter()
            .map(|r| (r.entry.player_id.as_str(), r.rank))
            .collect();
        assert_eq!(
            order,
            vec![("b", Some(1)), ("c", Some(2)), ("a", Some(3))]
        );
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let snapshot = snapshot_of(vec![
            scored("10", 4, 0),
            scored("2", 4, 0),
            scored("30", 1, 0),
        ]);

        let first = rank(&snapshot, &HashMap::new());
        let second = rank(&snapshot, &HashMap::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_break_by_player_id_ascending() {
        let snapshot = snapshot_of(vec![scored("20", 4, 0), scored("11", 4, 0)]);

        let map = rank_map(&snapshot);
        assert_eq!(map["11"], 1);
        assert_eq!(map["20"], 2);
    }

    #[test]
    fn test_errored_entries_excluded_from_ranking() {
        let snapshot = snapshot_of(vec![
            scored("1", 2, 0),
            SnapshotEntry::errored("2", "timed out"),
        ]);

        let ranked = rank(&snapshot, &HashMap::new());

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[1].rank, None);
        assert_eq!(ranked[1].delta, DeltaLabel::Errored);
        assert!(!rank_map(&snapshot).contains_key("2"));
    }

    #[test]
    fn test_delta_labels() {
        let previous = snapshot_of(vec![
            scored("p1", 10, 0), // rank 1
            scored("p2", 8, 0),  // rank 2
            scored("p3", 6, 0),  // rank 3
            scored("p4", 4, 0),  // rank 4
            scored("p5", 2, 0),  // rank 5
        ]);
        let previous_ranks = rank_map(&previous);

        // p5 jumps to rank 2, p1 stays first, p6 is new
        let current = snapshot_of(vec![
            scored("p1", 10, 0),
            scored("p5", 9, 0),
            scored("p2", 8, 0),
            scored("p3", 6, 0),
            scored("p4", 4, 0),
            scored("p6", 1, 0),
        ]);

        let ranked = rank(&current, &previous_ranks);
        let by_id: HashMap<_, _> = ranked
            .iter()
            .map(|r| (r.entry.player_id.as_str(), r.delta))
            .collect();

        assert_eq!(by_id["p1"], DeltaLabel::Unchanged);
        assert_eq!(by_id["p5"], DeltaLabel::Up(3));
        assert_eq!(by_id["p2"], DeltaLabel::Down(1));
        assert_eq!(by_id["p6"], DeltaLabel::New);
    }

    #[test]
    fn test_delta_display_glyphs() {
        assert_eq!(DeltaLabel::Up(3).to_string(), "↑3");
        assert_eq!(DeltaLabel::Down(1).to_string(), "↓1");
        assert_eq!(DeltaLabel::Unchanged.to_string(), "-");
        assert_eq!(DeltaLabel::New.to_string(), "New");
        assert_eq!(DeltaLabel::Errored.to_string(), "error");
    }

    #[test]
    fn test_negative_scores_still_rank() {
        let snapshot = snapshot_of(vec![scored("a", 0, 5), scored("b", 1, 0)]);

        let map = rank_map(&snapshot);
        assert_eq!(map["b"], 1);
        assert_eq!(map["a"], 2);
    }
}
