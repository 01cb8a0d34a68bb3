//! Snapshot model, merge engine, and persistence
//!
//! The snapshot is the cross-run memory of the system: the best-known record
//! for every player seen so far. Each run merges its extraction outcomes into
//! the previous snapshot and persists the result for the next one.

mod merge;
mod store;
mod types;

pub use merge::merge;
pub use store::{
    load_snapshot, save_display, save_snapshot, DisplayEntry, DisplaySnapshot, StoreError,
    StoreResult,
};
pub use types::{Snapshot, SnapshotEntry};
