//! Extraction client
//!
//! Drives one leased automation session through the fixed sequence of steps
//! that surfaces a profile's manager-mode record, and converts every possible
//! failure along the way into a per-target [`ExtractionOutcome::Failure`].
//! Nothing here can fail the run as a whole.

use crate::extraction::record::{parse_record_summary, PlayerRecord};
use crate::extraction::ExtractionOutcome;
use crate::session::{DriverError, Locator, SessionDriver};
use crate::targets::{extract_player_id, CrawlTarget};
use std::time::Duration;

// Page selectors, as rendered by the profile popup
const PROFILE_CONTAINER: &str = "selector_wrap";
const LEAGUE_SELECTOR: &str = "league";
const MANAGER_MODE_TAB: &str = "a[onclick='SetType(52);']";
const RECORD_SUMMARY: &str = "grade_desc";
const OWNER_NAME: &str = "coach";

/// Per-step wait timeouts for one extraction
#[derive(Debug, Clone)]
pub struct ExtractionTiming {
    /// Wait for the profile container after navigation
    pub container_timeout: Duration,

    /// Wait for clickable controls (league selector, manager-mode tab)
    pub control_timeout: Duration,

    /// Fixed settle after opening the league dropdown
    pub dropdown_settle: Duration,

    /// Fixed settle for manager-mode data to populate after switching
    pub mode_settle: Duration,

    /// Wait for the record summary element
    pub record_timeout: Duration,

    /// Wait for the owner name element
    pub name_timeout: Duration,
}

impl Default for ExtractionTiming {
    fn default() -> Self {
        Self {
            container_timeout: Duration::from_secs(10),
            control_timeout: Duration::from_secs(5),
            dropdown_settle: Duration::from_secs(1),
            mode_settle: Duration::from_secs(10),
            record_timeout: Duration::from_secs(10),
            name_timeout: Duration::from_secs(5),
        }
    }
}

/// Extracts one profile through a leased session
///
/// Steps run in strict order: navigate, wait for the profile container, open
/// the league selector, switch to manager mode, settle, read and parse the
/// record summary, read the owner name. Any timeout, missing element, or
/// parse mismatch yields a `Failure` for this target only.
pub async fn extract(
    driver: &mut dyn SessionDriver,
    target: &CrawlTarget,
    timing: &ExtractionTiming,
) -> ExtractionOutcome {
    // The id is a pure URL match; without it the result could never be keyed
    // into the snapshot, so don't spend an automation session on it.
    let player_id = match extract_player_id(&target.url) {
        Some(id) => id,
        None => {
            return ExtractionOutcome::Failure {
                player_id: None,
                error_detail: format!("no numeric player id in URL {}", target.url),
            }
        }
    };

    tracing::debug!("Extracting profile {} from {}", player_id, target.url);

    if let Err(e) = driver.navigate(&target.url).await {
        return step_failure(player_id, "navigate", e);
    }

    let container = Locator::class_name(PROFILE_CONTAINER);
    if let Err(e) = driver
        .wait_for_element(&container, timing.container_timeout)
        .await
    {
        return step_failure(player_id, "profile container", e);
    }

    let league = Locator::class_name(LEAGUE_SELECTOR);
    if let Err(e) = driver.click(&league, timing.control_timeout).await {
        return step_failure(player_id, "league selector", e);
    }
    tokio::time::sleep(timing.dropdown_settle).await;

    let manager_tab = Locator::css(MANAGER_MODE_TAB);
    if let Err(e) = driver.click(&manager_tab, timing.control_timeout).await {
        return step_failure(player_id, "manager mode tab", e);
    }

    // Mode data populates client-side; nothing to wait on but the clock
    tokio::time::sleep(timing.mode_settle).await;

    let summary = Locator::class_name(RECORD_SUMMARY);
    let record_text = match driver.element_text(&summary, timing.record_timeout).await {
        Ok(text) => text,
        Err(e) => return step_failure(player_id, "record summary", e),
    };

    let (wins, draws, losses) = match parse_record_summary(&record_text) {
        Some(counts) => counts,
        None => {
            return ExtractionOutcome::Failure {
                player_id: Some(player_id),
                error_detail: format!("unparseable record summary: {:?}", record_text),
            }
        }
    };

    let owner = Locator::class_name(OWNER_NAME);
    let owner_name = match driver.element_text(&owner, timing.name_timeout).await {
        Ok(text) => text,
        Err(e) => return step_failure(player_id, "owner name", e),
    };

    ExtractionOutcome::Success {
        player_id,
        owner_name,
        record: PlayerRecord::from_counts(wins, draws, losses),
    }
}

fn step_failure(player_id: String, step: &str, error: DriverError) -> ExtractionOutcome {
    ExtractionOutcome::Failure {
        player_id: Some(player_id),
        error_detail: format!("{}: {}", step, error),
    }
}
