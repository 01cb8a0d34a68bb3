//! Snapshot merge engine
//!
//! Combines the previous run's snapshot with this run's extraction outcomes.
//! The policy is a monotone best-known-so-far merge rather than a plain
//! overwrite: a bad automation run can never regress a player's recorded
//! standing, and stale data survives transient misses.

use crate::extraction::ExtractionOutcome;
use crate::snapshot::types::{Snapshot, SnapshotEntry};

/// Merges extraction outcomes into the previous snapshot
///
/// Per player id present in either input:
/// 1. No outcome this run: the previous entry survives unchanged.
/// 2. Failure with no previous entry: the failure is recorded, so errors stay
///    visible even with no baseline.
/// 3. Failure over an existing entry: the previous entry is kept.
/// 4. Success over no entry or over an errored entry: adopted.
/// 5. Success over a numeric entry: adopted only when its efficiency score is
///    strictly greater.
///
/// Outcomes with no player id cannot be keyed and are skipped with a warning;
/// they still count as failures in the run summary upstream.
pub fn merge(previous: &Snapshot, outcomes: &[ExtractionOutcome]) -> Snapshot {
    let mut merged = previous.clone();

    for outcome in outcomes {
        match outcome {
            ExtractionOutcome::Failure {
                player_id: None,
                error_detail,
            } => {
                tracing::warn!("Unkeyed failure left out of snapshot: {}", error_detail);
            }

            ExtractionOutcome::Failure {
                player_id: Some(player_id),
                error_detail,
            } => {
                if merged.get(player_id).is_none() {
                    merged.insert(SnapshotEntry::errored(player_id.clone(), error_detail.clone()));
                } else {
                    tracing::debug!(
                        "Keeping previous entry for {} over failed extraction",
                        player_id
                    );
                }
            }

            ExtractionOutcome::Success {
                player_id,
                owner_name,
                record,
            } => {
                let previous_score = merged.get(player_id).and_then(SnapshotEntry::efficiency_score);
                match previous_score {
                    Some(prev) if record.efficiency_score <= prev => {
                        tracing::debug!(
                            "Keeping previous score {} for {} over new score {}",
                            prev,
                            player_id,
                            record.efficiency_score
                        );
                    }
                    _ => {
                        merged.insert(SnapshotEntry::scored(
                            player_id.clone(),
                            owner_name.clone(),
                            record.clone(),
                        ));
                    }
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PlayerRecord;

    fn success(id: &str, wins: u32, draws: u32, losses: u32) -> ExtractionOutcome {
        ExtractionOutcome::Success {
            player_id: id.to_string(),
            owner_name: format!("owner-{}", id),
            record: PlayerRecord::from_counts(wins, draws, losses),
        }
    }

    fn failure(id: &str) -> ExtractionOutcome {
        ExtractionOutcome::Failure {
            player_id: Some(id.to_string()),
            error_detail: "profile container: timed out".to_string(),
        }
    }

    fn scored_snapshot(pairs: &[(&str, u32)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (id, wins) in pairs {
            snapshot.insert(SnapshotEntry::scored(
                *id,
                format!("owner-{}", id),
                PlayerRecord::from_counts(*wins, 0, 0),
            ));
        }
        snapshot
    }

    #[test]
    fn test_absent_outcome_keeps_previous() {
        let previous = scored_snapshot(&[("1", 5)]);
        let merged = merge(&previous, &[]);
        assert_eq!(merged.get("1"), previous.get("1"));
    }

    #[test]
    fn test_failure_without_baseline_is_recorded() {
        let merged = merge(&Snapshot::new(), &[failure("1")]);

        let entry = merged.get("1").unwrap();
        assert!(!entry.has_score());
        assert!(entry.error_detail.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn test_failure_never_erases_known_good_data() {
        let previous = scored_snapshot(&[("1", 5)]);
        let merged = merge(&previous, &[failure("1")]);

        assert_eq!(merged.get("1"), previous.get("1"));
    }

    #[test]
    fn test_success_adopted_over_errored_entry() {
        let mut previous = Snapshot::new();
        previous.insert(SnapshotEntry::errored("1", "old error"));

        let merged = merge(&previous, &[success("1", 2, 0, 0)]);

        let entry = merged.get("1").unwrap();
        assert_eq!(entry.efficiency_score(), Some(14));
        assert!(entry.error_detail.is_none());
    }

    #[test]
    fn test_higher_score_adopted_lower_rejected() {
        // previous efficiency for "1": 5 wins -> 35
        let previous = scored_snapshot(&[("1", 5)]);

        let merged = merge(&previous, &[success("1", 6, 0, 0)]);
        assert_eq!(merged.get("1").unwrap().efficiency_score(), Some(42));

        let merged = merge(&previous, &[success("1", 4, 0, 0)]);
        assert_eq!(merged.get("1").unwrap().efficiency_score(), Some(35));
    }

    #[test]
    fn test_equal_score_keeps_previous() {
        let previous = scored_snapshot(&[("1", 5)]);
        let merged = merge(&previous, &[success("1", 5, 0, 0)]);

        // Strictly-greater rule: the previous entry object survives
        assert_eq!(merged.get("1"), previous.get("1"));
    }

    #[test]
    fn test_merge_is_monotone() {
        let previous = scored_snapshot(&[("1", 10), ("2", 3)]);
        let outcomes = vec![success("1", 1, 0, 50), failure("2"), success("3", 0, 0, 5)];

        let merged = merge(&previous, &outcomes);

        for entry in previous.iter() {
            let before = entry.efficiency_score().unwrap();
            let after = merged.get(&entry.player_id).unwrap().efficiency_score().unwrap();
            assert!(after >= before);
        }
        // New player adopted even with a negative score
        assert_eq!(merged.get("3").unwrap().efficiency_score(), Some(-5));
    }

    #[test]
    fn test_unkeyed_failure_is_skipped() {
        let outcomes = vec![ExtractionOutcome::Failure {
            player_id: None,
            error_detail: "no numeric player id in URL".to_string(),
        }];

        let merged = merge(&Snapshot::new(), &outcomes);
        assert!(merged.is_empty());
    }
}
