//! Profile extraction
//!
//! This module contains the extraction client that drives an automation
//! session through one profile page, and the record parsing that turns the
//! page's summary text into numeric performance fields.

mod client;
mod record;

pub use client::{extract, ExtractionTiming};
pub use record::{parse_record_summary, PlayerRecord};

/// Result of extracting one crawl target
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The full record was read and parsed
    Success {
        player_id: String,
        owner_name: String,
        record: PlayerRecord,
    },

    /// Any timeout, missing element, or parse mismatch along the way
    Failure {
        /// Parsed from the URL when possible; None when the URL carries no id
        player_id: Option<String>,
        error_detail: String,
    },
}

impl ExtractionOutcome {
    /// The player id this outcome is keyed by, when known
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Self::Success { player_id, .. } => Some(player_id),
            Self::Failure { player_id, .. } => player_id.as_deref(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
