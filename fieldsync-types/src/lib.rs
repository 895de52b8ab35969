//! Core type definitions for FieldSync.
//!
//! This crate defines the fundamental types shared by the storage, API and
//! sync crates:
//! - Report identifiers (UUID v7)
//! - Incident reports and their validation rules
//! - Remote task records and the cached task snapshot
//!
//! Presentation concerns (form rendering, thumbnailing, layout) live in the
//! embedding application, not here.

mod ids;
mod report;
mod task;

pub use ids::ReportId;
pub use report::{
    DeliveryStatus, GeoPoint, ImagePayload, Report, ValidationError, MAX_DESCRIPTION_CHARS,
    MAX_IMAGES, MAX_IMAGE_BYTES,
};
pub use task::{Task, TaskPriority, TaskSnapshot, TaskStatus, TimeWindow};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Milliseconds since the Unix epoch, from the system wall clock.
#[must_use]
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
