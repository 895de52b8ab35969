//! Remote client for FieldSync.
//!
//! A thin request layer over the remote reporting service with two logical
//! operations (submit a report, fetch the task list), exponential-backoff
//! retry for transient failures, and a classification policy separating
//! retryable (server/network/timeout) from non-retryable (client/validation)
//! failures.
//!
//! # Example
//!
//! ```no_run
//! use fieldsync_api::{ApiConfig, HttpApi, ReportApi, TaskQuery};
//!
//! # async fn demo() -> Result<(), fieldsync_api::ApiError> {
//! let api = HttpApi::new(ApiConfig {
//!     base_url: "https://api.example.org/api".to_string(),
//!     ..Default::default()
//! })?;
//!
//! let tasks = api.fetch_tasks(&TaskQuery::default()).await?;
//! println!("{} tasks", tasks.total_count);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod retry;

pub use client::{
    ApiConfig, HttpApi, ReportApi, SubmitResponse, TaskListResponse, TaskQuery,
    DEFAULT_TIMEOUT_MS,
};
pub use error::{ApiError, ApiResult};
pub use retry::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_RETRIES};
