//! Run coordinator
//!
//! One `run()` is the whole trigger operation: load the target list, drain
//! the worker pool, merge into the previous snapshot, rank, persist, and
//! report. Everything after the pool drain runs single-threaded on a
//! globally consistent view of the results.

use crate::config::Config;
use crate::crawler::worker_pool::{CancelHandle, WorkerPool};
use crate::extraction::ExtractionTiming;
use crate::ranking::{self, RankedEntry};
use crate::session::{DriverFactory, SessionPool, WebDriverFactory};
use crate::snapshot::{
    self, DisplayEntry, DisplaySnapshot, Snapshot,
};
use crate::targets::{extract_player_id, load_targets, CrawlTarget};
use crate::MineError;
use chrono::Local;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Counts reported after every run, errors included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total_targets: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything a trigger caller gets back
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub ranked: Vec<RankedEntry>,
}

/// Coordinates one full crawl cycle
pub struct Coordinator {
    config: Arc<Config>,
    factory: Arc<dyn DriverFactory>,
}

impl Coordinator {
    /// Creates a coordinator driving the configured WebDriver endpoint
    pub fn new(config: Config) -> Result<Self, MineError> {
        let factory = WebDriverFactory::new(&config.session.webdriver_url)?;
        Ok(Self::with_factory(config, Arc::new(factory)))
    }

    /// Creates a coordinator with a caller-supplied driver factory
    pub fn with_factory(config: Config, factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
        }
    }

    /// Runs one crawl cycle to completion
    ///
    /// Synchronous from the caller's perspective: returns only after the
    /// pool has drained and the merged, ranked state is persisted. Only a
    /// target-list failure or an unconstructible session pool is fatal;
    /// everything else degrades to per-target failures in the report.
    pub async fn run(&self) -> Result<RunReport, MineError> {
        self.run_with_cancel(&CancelHandle::new()).await
    }

    /// Runs one crawl cycle under an external cancellation signal
    pub async fn run_with_cancel(&self, cancel: &CancelHandle) -> Result<RunReport, MineError> {
        let started = std::time::Instant::now();
        let config = &self.config;

        let targets = load_targets(Path::new(&config.targets.list_path))?;
        let total_targets = targets.len();

        let snapshot_path = Path::new(&config.output.snapshot_path);
        let previous = snapshot::load_snapshot(snapshot_path);
        let previous_ranks = ranking::rank_map(&previous);

        let sessions = Arc::new(SessionPool::new(
            self.factory.clone(),
            config.session.pool_size as usize,
            config.session.usage_quota,
            Duration::from_secs(config.session.lease_timeout_secs),
        ));
        let workers = WorkerPool::new(
            sessions.clone(),
            extraction_timing(config),
            config.crawler.concurrency,
        );

        let drain = workers.run(targets.clone(), cancel).await;
        sessions.shutdown().await;

        if let Some(fatal) = drain.fatal {
            return Err(fatal.into());
        }

        let succeeded = drain.outcomes.iter().filter(|o| o.is_success()).count();
        let summary = RunSummary {
            total_targets,
            succeeded,
            failed: total_targets - succeeded,
        };

        let merged = snapshot::merge(&previous, &drain.outcomes);
        let ranked = ranking::rank(&merged, &previous_ranks);

        self.persist(snapshot_path, &merged, &ranked, &targets);

        tracing::info!(
            "Run complete in {:?}: {}/{} targets succeeded, {} failed",
            started.elapsed(),
            summary.succeeded,
            summary.total_targets,
            summary.failed
        );

        Ok(RunReport { summary, ranked })
    }

    /// Writes both output files; persistence failure never fails the run,
    /// but each file is reported distinctly so operators know whether the
    /// next run's comparison baseline is stale.
    fn persist(
        &self,
        snapshot_path: &Path,
        merged: &Snapshot,
        ranked: &[RankedEntry],
        targets: &[CrawlTarget],
    ) {
        if let Err(e) = snapshot::save_snapshot(snapshot_path, merged) {
            tracing::error!(
                "Failed to persist snapshot ({}); next run's comparison baseline will be stale",
                e
            );
        }

        let display = build_display(ranked, targets);
        let display_path = Path::new(&self.config.output.display_path);
        if let Err(e) = snapshot::save_display(display_path, &display) {
            tracing::error!("Failed to write display snapshot ({})", e);
        }
    }
}

fn extraction_timing(config: &Config) -> ExtractionTiming {
    let crawler = &config.crawler;
    ExtractionTiming {
        container_timeout: Duration::from_secs(crawler.container_timeout_secs),
        control_timeout: Duration::from_secs(crawler.control_timeout_secs),
        dropdown_settle: Duration::from_millis(crawler.dropdown_settle_millis),
        mode_settle: Duration::from_secs(crawler.mode_settle_secs),
        record_timeout: Duration::from_secs(crawler.record_timeout_secs),
        name_timeout: Duration::from_secs(crawler.name_timeout_secs),
    }
}

/// Joins the ranked set with this run's target list for the renderer
fn build_display(ranked: &[RankedEntry], targets: &[CrawlTarget]) -> DisplaySnapshot {
    let by_id: HashMap<String, &CrawlTarget> = targets
        .iter()
        .filter_map(|t| extract_player_id(&t.url).map(|id| (id, t)))
        .collect();

    let results = ranked
        .iter()
        .map(|entry| {
            let target = by_id.get(entry.entry.player_id.as_str());
            DisplayEntry::from_ranked(
                entry,
                target.map(|t| t.url.clone()),
                target.and_then(|t| {
                    if t.annotation.is_empty() {
                        None
                    } else {
                        Some(t.annotation.clone())
                    }
                }),
            )
        })
        .collect();

    DisplaySnapshot {
        results,
        last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Runs one crawl cycle with the given configuration
///
/// # Example
///
/// ```no_run
/// use leaguemine::config::load_config;
/// use leaguemine::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = crawl(config).await?;
/// println!("{} succeeded", report.summary.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<RunReport, MineError> {
    Coordinator::new(config)?.run().await
}
