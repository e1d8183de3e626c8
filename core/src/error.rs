//! Error types for the client and its transports.
//!
//! # Design
//! Callers see one error type, `FetchError`, with exactly three kinds. A
//! timeout is kept apart from every other failure so callers can branch on
//! it; everything else that has a description is folded into `Request` with
//! its message preserved. Non-2xx statuses are never errors here.

use thiserror::Error;

/// Errors returned by `HttpClient` calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The per-request timeout fired before the transport settled.
    #[error("Request timed out")]
    Timeout,

    /// The transport failed, or the body could not be encoded or decoded.
    #[error("SwiftFetch Error: {0}")]
    Request(String),

    /// The transport failed without any describable cause.
    #[error("An unknown error occurred")]
    Unknown,
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Request(err.to_string())
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Aborted => FetchError::Timeout,
            TransportError::Failed(message) => FetchError::Request(message),
            TransportError::Unknown => FetchError::Unknown,
        }
    }
}

/// Failures reported by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The cancellation signal fired while the exchange was in flight.
    #[error("request aborted")]
    Aborted,

    /// Network, DNS, TLS, malformed request or body read failure.
    #[error("{0}")]
    Failed(String),

    /// The transport gave up without a cause it could describe.
    #[error("unknown transport failure")]
    Unknown,
}
