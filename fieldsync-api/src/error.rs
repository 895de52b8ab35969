//! Remote-client error types and retry classification.
//!
//! Every failure is classified as either retryable (network failure, 5xx,
//! per-attempt timeout) or non-retryable (4xx rejection, undecodable
//! body). The retry policy branches on [`ApiError::is_retryable`] rather
//! than on error source, so transports can map their own failures into
//! the same taxonomy.

use thiserror::Error;

/// Result type for remote-client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur when calling the remote service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service rejected the payload (HTTP 4xx). Never retried.
    #[error("client error {status}: {message}")]
    Client { status: u16, message: String },

    /// Server-side failure (HTTP 5xx). Retried per the backoff policy.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The request never completed (DNS, connect, TLS, broken pipe).
    #[error("network error: {0}")]
    Network(String),

    /// A single attempt exceeded the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded against the contract.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classifies an HTTP status into an error, carrying the body text as
    /// the human-readable message.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        if (400..500).contains(&status) {
            ApiError::Client { status, message }
        } else {
            ApiError::Server { status, message }
        }
    }

    /// Returns true if the retry policy should attempt this call again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Timeout => true,
            ApiError::Client { .. } | ApiError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_4xx_is_client_and_not_retryable() {
        let err = ApiError::from_status(422, "rejected".to_string());
        assert!(matches!(err, ApiError::Client { status: 422, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_5xx_is_server_and_retryable() {
        let err = ApiError::from_status(503, "unavailable".to_string());
        assert!(matches!(err, ApiError::Server { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn timeout_and_network_are_retryable() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::Network("connection refused".to_string()).is_retryable());
    }

    #[test]
    fn decode_is_not_retryable() {
        assert!(!ApiError::Decode("bad json".to_string()).is_retryable());
    }
}
