//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Failure talking to the chat platform
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    /// Classify a failed Bot API call from its HTTP status
    pub fn from_status(
        method: &str,
        status: u16,
        description: &str,
        retry_after: Option<u64>,
    ) -> Self {
        let message = format!("{method}: {description}");
        let error = match status {
            401 | 403 => Self::auth(message),
            429 => Self::rate_limit(message),
            400 | 404 | 413 => Self::invalid_request(message),
            500..=599 => Self::server_error(message),
            _ => Self::unknown(format!("{method}: HTTP {status}: {description}")),
        };
        match retry_after {
            Some(secs) => error.with_retry_after(Duration::from_secs(secs)),
            None => error,
        }
    }

    /// The request never produced a response
    pub fn from_request(method: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::network(format!("{method}: request timeout: {error}"))
        } else if error.is_connect() {
            Self::network(format!("{method}: connection failed: {error}"))
        } else {
            Self::unknown(format!("{method}: request failed: {error}"))
        }
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Network issues, timeouts - retryable
    Network,
    /// Flood control (429) - retryable after `retry_after`
    RateLimit,
    /// Server error (5xx) - retryable
    ServerError,
    /// Bad or revoked token - not retryable
    Auth,
    /// Rejected request, e.g. unknown chat or oversized file
    InvalidRequest,
    Unknown,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
