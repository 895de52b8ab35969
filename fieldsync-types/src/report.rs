//! Incident reports and their validation rules.
//!
//! A `Report` is the unit of work the sync core delivers. Reports are
//! produced by the submission layer, validated at the producer boundary,
//! and either submitted directly or persisted into the pending queue until
//! connectivity returns.

use crate::ReportId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of code points allowed in a report description.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Maximum number of images attached to a single report.
pub const MAX_IMAGES: usize = 10;

/// Maximum decoded size of a single image payload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for image payloads.
const ACCEPTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Validation failures rejected at the producer boundary, before a report
/// ever reaches the queue. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither an image nor a non-empty description was provided.
    #[error("report must include at least one photo or a description")]
    MissingContent,

    #[error("description is {chars} characters; at most {MAX_DESCRIPTION_CHARS} allowed")]
    DescriptionTooLong { chars: usize },

    #[error("report has {count} images; at most {MAX_IMAGES} allowed")]
    TooManyImages { count: usize },

    #[error("unsupported image content type: {content_type}")]
    UnsupportedImageType { content_type: String },

    #[error("image is {bytes} bytes; at most {MAX_IMAGE_BYTES} allowed")]
    ImageTooLarge { bytes: usize },
}

/// Delivery status of a report in the pending queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Waiting in the pending queue for the next drain cycle.
    Queued,
    /// A drain cycle is currently attempting delivery.
    Submitting,
    /// Confirmed received by the remote service.
    Delivered,
    /// Rejected by the remote service; kept for manual intervention.
    Failed,
}

/// A binary image payload, base64-encoded for transport and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// MIME content type (e.g. `image/jpeg`).
    pub content_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImagePayload {
    /// Creates a payload from already-encoded data.
    pub fn new(content_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Estimated decoded size in bytes (3 bytes per 4 base64 characters).
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

/// An optional capture location attached to a report or task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable address, when reverse geocoding was available.
    pub address: Option<String>,
}

/// A single incident report awaiting or having completed delivery.
///
/// Serialized in camelCase: the wire contract and the persisted queue
/// schema both predate this crate and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Stable identifier; generated client-side if the producer omits one.
    pub id: ReportId,
    /// Ordered image payloads, oldest capture first.
    pub images: Vec<ImagePayload>,
    /// Free-text description, trimmed by the producer.
    pub description: String,
    /// Creation time (milliseconds since Unix epoch).
    pub created_at: u64,
    /// Capture location, when available.
    pub location: Option<GeoPoint>,
    /// Current delivery status.
    pub status: DeliveryStatus,
    /// Number of retryable delivery failures so far.
    pub retry_count: u32,
    /// When the report was last placed into the pending queue.
    pub queued_at: Option<u64>,
}

impl Report {
    /// Creates a new report with a fresh ID and the current timestamp.
    pub fn new(images: Vec<ImagePayload>, description: impl Into<String>) -> Self {
        Self {
            id: ReportId::new(),
            images,
            description: description.into(),
            created_at: crate::unix_millis(),
            location: None,
            status: DeliveryStatus::Queued,
            retry_count: 0,
            queued_at: None,
        }
    }

    /// Attaches a capture location.
    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns true if the report carries submittable content.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.images.is_empty() || !self.description.trim().is_empty()
    }

    /// Validates the report for submission.
    ///
    /// A report is valid iff it has at least one image or a non-empty
    /// description after trimming, the description fits within
    /// [`MAX_DESCRIPTION_CHARS`] code points, and every image is within the
    /// count/type/size bounds. A content-free report yields exactly one
    /// [`ValidationError::MissingContent`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_content() {
            return Err(ValidationError::MissingContent);
        }

        let chars = self.description.chars().count();
        if chars > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong { chars });
        }

        if self.images.len() > MAX_IMAGES {
            return Err(ValidationError::TooManyImages {
                count: self.images.len(),
            });
        }

        for image in &self.images {
            if !ACCEPTED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
                return Err(ValidationError::UnsupportedImageType {
                    content_type: image.content_type.clone(),
                });
            }
            let bytes = image.decoded_len();
            if bytes > MAX_IMAGE_BYTES {
                return Err(ValidationError::ImageTooLarge { bytes });
            }
        }

        Ok(())
    }
}
