//! Worker pool orchestrator
//!
//! Fans the target list out across a fixed number of concurrent workers.
//! Each worker draws from a shared queue, leases a session, runs one
//! extraction, and reports the outcome; a failed target never cancels its
//! siblings. The worker count bounds total wall-clock at roughly
//! `ceil(targets / concurrency)` times the worst single-target latency,
//! because sessions are the scarce resource, not tasks.

use crate::extraction::{extract, ExtractionOutcome, ExtractionTiming};
use crate::session::{PoolError, SessionPool};
use crate::targets::{extract_player_id, CrawlTarget};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Run-level cancellation signal
///
/// Cancelling stops workers from taking new targets; an in-flight extraction
/// runs to its own timeouts rather than being interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// What the pool drain produced
pub struct DrainOutput {
    /// One outcome per processed target, in completion order
    pub outcomes: Vec<ExtractionOutcome>,

    /// Set when no automation session was constructible at all; the run
    /// cannot proceed and the coordinator surfaces this as fatal
    pub fatal: Option<PoolError>,
}

/// Fixed-size worker pool over a shared session pool
pub struct WorkerPool {
    sessions: Arc<SessionPool>,
    timing: ExtractionTiming,
    concurrency: u32,
}

impl WorkerPool {
    pub fn new(sessions: Arc<SessionPool>, timing: ExtractionTiming, concurrency: u32) -> Self {
        Self {
            sessions,
            timing,
            concurrency,
        }
    }

    /// Drains the target list through the workers
    ///
    /// Every submitted target yields exactly one outcome (unless the run is
    /// cancelled or dies to a fatal pool failure); outcome order follows
    /// completion, not submission.
    pub async fn run(&self, targets: Vec<CrawlTarget>, cancel: &CancelHandle) -> DrainOutput {
        let total = targets.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(targets)));
        let fatal: Arc<Mutex<Option<PoolError>>> = Arc::new(Mutex::new(None));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let workers = (self.concurrency as usize).min(total.max(1));
        tracing::info!("Draining {} targets across {} workers", total, workers);

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = queue.clone();
            let sessions = self.sessions.clone();
            let timing = self.timing.clone();
            let cancel = cancel.clone();
            let fatal = fatal.clone();
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, queue, sessions, timing, cancel, fatal, tx).await;
            }));
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
            if outcomes.len() % 5 == 0 {
                tracing::info!("Progress: {}/{} targets extracted", outcomes.len(), total);
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let fatal = fatal.lock().unwrap().take();
        DrainOutput { outcomes, fatal }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<CrawlTarget>>>,
    sessions: Arc<SessionPool>,
    timing: ExtractionTiming,
    cancel: CancelHandle,
    fatal: Arc<Mutex<Option<PoolError>>>,
    tx: mpsc::UnboundedSender<ExtractionOutcome>,
) {
    loop {
        if cancel.is_cancelled() {
            tracing::debug!("Worker {} stopping on cancellation", worker_id);
            break;
        }

        let target = match queue.lock().unwrap().pop_front() {
            Some(target) => target,
            None => break,
        };

        let outcome = match sessions.acquire().await {
            Ok(mut lease) => {
                let outcome = extract(lease.driver_mut(), &target, &timing).await;
                sessions.release(lease, true).await;
                outcome
            }

            Err(PoolError::Construction {
                fatal: true,
                source,
            }) => {
                tracing::error!("No automation session constructible; aborting run");
                cancel.cancel();
                *fatal.lock().unwrap() = Some(PoolError::Construction {
                    fatal: true,
                    source,
                });
                break;
            }

            Err(e) => {
                tracing::warn!("Worker {} could not obtain a session: {}", worker_id, e);
                ExtractionOutcome::Failure {
                    player_id: extract_player_id(&target.url),
                    error_detail: format!("session pool: {}", e),
                }
            }
        };

        if tx.send(outcome).is_err() {
            break;
        }
    }
}
