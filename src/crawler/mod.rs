//! Crawl orchestration
//!
//! This module contains the concurrent half of the system:
//! - The worker pool that fans targets out over leased sessions
//! - The coordinator that runs a full crawl cycle end to end
//! - Run-level cancellation

mod coordinator;
mod worker_pool;

pub use coordinator::{crawl, Coordinator, RunReport, RunSummary};
pub use worker_pool::{CancelHandle, DrainOutput, WorkerPool};
