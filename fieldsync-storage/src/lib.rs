//! SQLite storage layer for FieldSync.
//!
//! Provides the durable, offline-first store behind the sync core. State
//! lives in three logical partitions whose names are stable API — changing
//! them would orphan reports queued by earlier versions:
//!
//! - `report_queue`: the FIFO pending-report queue (JSON array)
//! - `task_cache`: the last fetched task snapshot (JSON record)
//! - `app_state`: arbitrary application state (JSON value)
//!
//! # Architecture
//!
//! Each partition holds exactly one top-level JSON value in a single
//! `partitions` table. All operations are async; the underlying SQLite
//! work runs on the blocking thread pool so callers never stall the
//! cooperative scheduler.

mod error;
mod store;

pub use error::{StorageError, StorageResult};
pub use store::{ReportStore, StorageSummary};

/// Partition holding the pending-report queue.
pub const PARTITION_REPORT_QUEUE: &str = "report_queue";

/// Partition holding the cached task snapshot.
pub const PARTITION_TASK_CACHE: &str = "task_cache";

/// Partition holding arbitrary application state.
pub const PARTITION_APP_STATE: &str = "app_state";
