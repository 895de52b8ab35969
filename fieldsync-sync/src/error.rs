//! Error types for the sync layer.

use fieldsync_api::ApiError;
use fieldsync_storage::StorageError;
use fieldsync_types::ValidationError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The report was rejected at the producer boundary. Never retried.
    #[error("invalid report: {0}")]
    Validation(#[from] ValidationError),

    /// The durable store failed on a write path.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The remote service failed after retry exhaustion, or rejected the
    /// payload outright.
    #[error("remote error: {0}")]
    Api(#[from] ApiError),
}
