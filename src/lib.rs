//! Leaguemine: a league standings miner
//!
//! This crate crawls a fixed list of player profile pages through a pooled
//! browser-automation backend, parses each manager-mode record, scores it,
//! and maintains a ranked snapshot across runs with per-player rank deltas.

pub mod config;
pub mod crawler;
pub mod extraction;
pub mod ranking;
pub mod session;
pub mod snapshot;
pub mod targets;

use thiserror::Error;

/// Main error type for leaguemine operations
#[derive(Debug, Error)]
pub enum MineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Target list error: {0}")]
    TargetList(#[from] targets::TargetListError),

    #[error("Automation driver error: {0}")]
    Driver(#[from] session::DriverError),

    #[error("Session pool error: {0}")]
    SessionPool(#[from] session::PoolError),

    #[error("Snapshot store error: {0}")]
    Store(#[from] snapshot::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for leaguemine operations
pub type Result<T> = std::result::Result<T, MineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CancelHandle, Coordinator, RunReport, RunSummary};
pub use extraction::{ExtractionOutcome, PlayerRecord};
pub use ranking::{DeltaLabel, RankedEntry};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use targets::CrawlTarget;
