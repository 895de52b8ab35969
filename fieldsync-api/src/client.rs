//! HTTP transport for the remote reporting service.
//!
//! The wire contract is two logical operations: submit one report, fetch
//! the current task list. Everything transport-specific (base URL, paths,
//! timeout, auth token) lives in [`ApiConfig`] so a deployment can repoint
//! the client without code changes. The [`ReportApi`] trait is the seam the
//! sync engine depends on; swap in another implementation to talk to a
//! different backend.

use crate::error::{ApiError, ApiResult};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use fieldsync_types::{Report, Task};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the remote client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reporting service (e.g. `https://api.example.org/api`).
    pub base_url: String,
    /// Per-attempt request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Bearer token injected into every request when set.
    pub auth_token: Option<String>,
    /// Retry policy applied to both operations.
    #[serde(flatten)]
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            auth_token: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Filter for the task-list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Remote-side status filter.
    pub status: String,
    /// Maximum number of tasks to return.
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            status: "active".to_string(),
            limit: 50,
        }
    }
}

/// Response to a successful report submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub report_id: String,
    pub message: String,
    /// Estimated responder arrival, in minutes, when the service knows it.
    #[serde(default)]
    pub estimated_response_time: Option<u32>,
}

/// Response to a task-list fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    /// When the remote allocator last updated the list (millis since epoch).
    pub last_updated: u64,
    pub total_count: u64,
}

/// The remote reporting service, as the sync core sees it.
///
/// Implementations own retry and error classification; callers observe one
/// final result per logical operation.
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Sends one report to the remote endpoint.
    async fn submit_report(&self, report: &Report) -> ApiResult<SubmitResponse>;

    /// Fetches the current remote task list.
    async fn fetch_tasks(&self, query: &TaskQuery) -> ApiResult<TaskListResponse>;
}

/// HTTP implementation of [`ReportApi`] backed by reqwest.
pub struct HttpApi {
    config: ApiConfig,
    client: Client,
}

impl HttpApi {
    /// Creates a new client from the given configuration.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    /// One submission attempt, without retry.
    async fn submit_once(&self, report: &Report) -> ApiResult<SubmitResponse> {
        let mut request = self.client.post(self.endpoint("reports")).json(report);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        debug!(
            report_id = %report.id,
            image_count = report.images.len(),
            description_len = report.description.chars().count(),
            "submitting report"
        );

        let response = tokio::time::timeout(self.attempt_timeout(), request.send())
            .await
            .map_err(|_| ApiError::Timeout)??;

        decode(response).await
    }

    /// One task-list fetch attempt, without retry.
    async fn fetch_once(&self, query: &TaskQuery) -> ApiResult<TaskListResponse> {
        let mut request = self
            .client
            .get(self.endpoint("tasks"))
            .query(&[("status", query.status.as_str())])
            .query(&[("limit", query.limit)]);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = tokio::time::timeout(self.attempt_timeout(), request.send())
            .await
            .map_err(|_| ApiError::Timeout)??;

        decode(response).await
    }
}

#[async_trait]
impl ReportApi for HttpApi {
    async fn submit_report(&self, report: &Report) -> ApiResult<SubmitResponse> {
        self.config.retry.run(|| self.submit_once(report)).await
    }

    async fn fetch_tasks(&self, query: &TaskQuery) -> ApiResult<TaskListResponse> {
        self.config.retry.run(|| self.fetch_once(query)).await
    }
}

/// Classifies the status line, then decodes the body against the contract.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status.as_u16(), message));
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
