//! Error types used throughout the suite

use std::time::Duration;

use thiserror::Error;

/// Broad error classes used by the poller to decide whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credentials rejected or token endpoint failure
    Authentication,
    /// 5xx, connection failures, throttling - retryable
    Transient,
    /// 4xx and malformed responses - never retried
    Client,
    /// Cluster not in the state an operation requires
    Precondition,
    /// The control plane reported a terminal failure
    Operation,
    /// Deadline or retry budget exhausted
    Exhausted,
    /// Bad configuration or caller input
    Config,
}

/// Main error type for control-plane operations
#[derive(Error, Debug)]
pub enum DbaasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Missing item: {0}")]
    MissingItem(String),

    #[error("Cluster not ready: {0}")]
    NotReady(String),

    #[error("{action}: expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus { action: String, expected: u16, actual: u16, body: String },

    #[error("{operation} failed after {attempts} consecutive transient errors: {last_error}")]
    RetriesExhausted { operation: String, attempts: u32, last_error: String },

    #[error("{operation} did not complete in time (waited {waited:?})")]
    Timeout { operation: String, waited: Duration },

    #[error("Operation errored: {0}")]
    OperationFailed(String),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DbaasError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Network(_) | Self::Server(_) | Self::RateLimit(_) => ErrorCategory::Transient,
            Self::Client(_) | Self::Decode(_) | Self::UnexpectedStatus { .. } => {
                ErrorCategory::Client
            }
            Self::MissingItem(_) | Self::NotReady(_) => ErrorCategory::Precondition,
            Self::OperationFailed(_) | Self::Verification(_) => ErrorCategory::Operation,
            Self::RetriesExhausted { .. } | Self::Timeout { .. } => ErrorCategory::Exhausted,
            Self::Config(_) | Self::InvalidInput(_) => ErrorCategory::Config,
        }
    }

    /// Whether a poll loop may retry after this error
    ///
    /// Only 5xx, throttling and transport failures qualify; a 4xx is
    /// always surfaced immediately.
    pub fn is_transient(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    /// Build the error for an HTTP status that is not the one expected
    ///
    /// Server errors stay transient so that poll loops can absorb them.
    pub fn from_status(action: &str, expected: u16, actual: u16, body: &str) -> Self {
        match actual {
            429 => Self::RateLimit(format!("{action} returned 429: {body}")),
            500..=599 => Self::Server(format!("{action} returned {actual}: {body}")),
            _ => Self::UnexpectedStatus {
                action: action.to_string(),
                expected,
                actual,
                body: body.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for DbaasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, DbaasError>;
