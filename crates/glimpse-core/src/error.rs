//! Error types for the glimpse libraries.
//!
//! This module provides a unified error type with explicit variants for
//! transport, response-shape, service, and session-store failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for glimpse operations.
///
/// Every variant is terminal for the request it arose from; nothing is
/// retried internally, the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, HTTP-level failure).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Responses the client cannot make sense of (malformed URL or JSON,
    /// missing required fields, unrecognized status values).
    #[error("unknown response: {0}")]
    UnknownResponse(#[from] UnknownResponseError),

    /// The service itself reported the request as failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Caller errors against the session result store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (search term, API key).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
///
/// Raised by the network layer; the mapping from the HTTP client's error
/// type lives next to the client, keeping this crate transport-free.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Response-shape errors.
#[derive(Debug, Error)]
pub enum UnknownResponseError {
    /// A request or image URL could not be constructed.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// The response body was not valid JSON, or a required section did not
    /// have the expected shape.
    #[error("malformed JSON: {reason}")]
    Json { reason: String },

    /// A required top-level field was absent.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// The status field carried a value other than `ok` or `fail`.
    #[error("unrecognized stat value '{stat}'")]
    UnexpectedStat { stat: String },
}

/// Failure reported by the service (`stat: "fail"`).
///
/// The code and message are carried for display only; no behavior is
/// attached to particular codes.
#[derive(Debug)]
pub struct ApiError {
    /// Service error code, if present.
    pub code: Option<i64>,
    /// Service error message, if present.
    pub message: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: Option<i64>, message: Option<String>) -> Self {
        Self { code, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search reported as failed")?;
        if let Some(code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Caller errors against [`ResultStore`](crate::store::ResultStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The appended page belongs to a different search term; the store must
    /// be reset before a new term's pages can be appended.
    #[error("page for term '{offered}' appended to a session for '{current}'")]
    TermMismatch { current: String, offered: String },

    /// The appended page does not extend the page sequence by exactly one.
    #[error("non-sequential page append: expected page {expected}, got {got}")]
    NonSequentialPage { expected: u32, got: u32 },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid search term.
    #[error("invalid search term: {reason}")]
    SearchTerm { reason: String },

    /// Invalid API key.
    #[error("invalid API key: {reason}")]
    ApiKey { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_with_code_and_message() {
        let err = ApiError::new(Some(100), Some("Invalid API Key".to_string()));
        assert_eq!(
            err.to_string(),
            "search reported as failed [100]: Invalid API Key"
        );
    }

    #[test]
    fn api_error_display_bare() {
        let err = ApiError::new(None, None);
        assert_eq!(err.to_string(), "search reported as failed");
    }

    #[test]
    fn store_error_wraps_into_error() {
        let err: Error = StoreError::NonSequentialPage {
            expected: 2,
            got: 4,
        }
        .into();
        assert!(err.to_string().contains("expected page 2"));
    }
}
