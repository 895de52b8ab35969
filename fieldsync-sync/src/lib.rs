//! Offline-first sync engine for FieldSync.
//!
//! Field reporters work at the edge of connectivity: a report written in a
//! dead zone must survive process restarts and be delivered once the
//! network returns. This crate ties the durable store and the remote
//! client together:
//!
//! - **Front door**: validate a report, then submit directly or save it
//!   for later depending on connectivity
//! - **Drain cycle**: walk the pending queue in FIFO order and resubmit
//!   each report through the remote client, removing entries only on
//!   confirmed delivery
//! - **Task snapshot**: keep the last fetched task list cached for
//!   offline display
//!
//! All operations run on a single cooperative scheduler; the concurrency
//! guard ensures at most one drain cycle is in flight, and triggers that
//! arrive mid-cycle are coalesced.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fieldsync_api::{ApiConfig, HttpApi};
//! use fieldsync_storage::ReportStore;
//! use fieldsync_sync::SyncEngine;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let store = Arc::new(ReportStore::open("fieldsync.db")?);
//! let api = Arc::new(HttpApi::new(ApiConfig::default())?);
//! let engine = SyncEngine::new(store, api);
//!
//! // Invoked by the embedding layer on a connectivity-restored signal.
//! let outcome = engine.drain().await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;

pub use engine::{DrainOutcome, DrainReport, SubmitDisposition, SyncEngine, TasksView};
pub use error::{SyncError, SyncResult};
