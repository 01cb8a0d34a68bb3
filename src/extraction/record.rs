//! Record summary parsing and derived metrics
//!
//! The profile page renders a manager-mode record as `<wins>승 <draws>무
//! <losses>패`. This module parses that text and computes the derived
//! fields every downstream stage keys on.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Numeric performance fields for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub total_games: u32,

    /// Mining efficiency: `7*wins - 3*draws - losses`, signed
    pub efficiency_score: i64,

    /// Win percentage rounded to two decimals; 0.0 with no games played
    pub win_rate_percent: f64,
}

impl PlayerRecord {
    /// Builds a record from raw win/draw/loss counts
    pub fn from_counts(wins: u32, draws: u32, losses: u32) -> Self {
        let total_games = wins + draws + losses;
        let efficiency_score = 7 * i64::from(wins) - 3 * i64::from(draws) - i64::from(losses);
        let win_rate_percent = if total_games == 0 {
            0.0
        } else {
            let raw = f64::from(wins) / f64::from(total_games) * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Self {
            wins,
            draws,
            losses,
            total_games,
            efficiency_score,
            win_rate_percent,
        }
    }
}

/// Parses a record summary string into `(wins, draws, losses)`
///
/// Returns None when the text does not match `<n>승 <n>무 <n>패` (or the
/// matched digits overflow a u32, which the page never legitimately produces).
pub fn parse_record_summary(text: &str) -> Option<(u32, u32, u32)> {
    static RECORD_RE: OnceLock<Regex> = OnceLock::new();
    let re = RECORD_RE
        .get_or_init(|| Regex::new(r"(\d+)승\s*(\d+)무\s*(\d+)패").expect("valid regex"));

    let caps = re.captures(text)?;
    let wins = caps[1].parse().ok()?;
    let draws = caps[2].parse().ok()?;
    let losses = caps[3].parse().ok()?;
    Some((wins, draws, losses))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_summary() {
        assert_eq!(parse_record_summary("32승 5무 13패"), Some((32, 5, 13)));
        assert_eq!(parse_record_summary("0승0무0패"), Some((0, 0, 0)));
        assert_eq!(
            parse_record_summary("슈퍼챔피언스 1200점 7승  2무  1패"),
            Some((7, 2, 1))
        );
    }

    #[test]
    fn test_parse_record_summary_rejects_mismatch() {
        assert_eq!(parse_record_summary(""), None);
        assert_eq!(parse_record_summary("7승 2무"), None);
        assert_eq!(parse_record_summary("record pending"), None);
    }

    #[test]
    fn test_efficiency_score_formula() {
        assert_eq!(PlayerRecord::from_counts(32, 5, 13).efficiency_score, 196);
        assert_eq!(PlayerRecord::from_counts(1, 1, 1).efficiency_score, 3);
        // Negative scores are legitimate
        assert_eq!(PlayerRecord::from_counts(0, 0, 5).efficiency_score, -5);
        assert_eq!(PlayerRecord::from_counts(0, 2, 0).efficiency_score, -6);
    }

    #[test]
    fn test_win_rate_two_decimals() {
        let record = PlayerRecord::from_counts(16, 5, 9);
        assert_eq!(record.total_games, 30);
        assert_eq!(record.win_rate_percent, 53.33);

        assert_eq!(PlayerRecord::from_counts(1, 0, 2).win_rate_percent, 33.33);
        assert_eq!(PlayerRecord::from_counts(3, 0, 0).win_rate_percent, 100.0);
    }

    #[test]
    fn test_win_rate_zero_games() {
        assert_eq!(PlayerRecord::from_counts(0, 0, 0).win_rate_percent, 0.0);
    }
}
