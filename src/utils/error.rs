//! Error types for the sluice harvester
//!
//! This module defines the per-operation error types. None of them are fatal:
//! the scheduler logs them and moves on to the next item.

use thiserror::Error;

/// Errors that can occur while reading from a remote source
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP transport error (connection refused, reset, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Source answered with a status other than 200
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Body could not be read as a feed document
    #[error("Feed parse error: {0}")]
    Feed(String),

    /// Body could not be read as the expected JSON record
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether the remote end produced a response at all.
    ///
    /// Failures with a response are logged as warnings, failures without one
    /// as errors.
    pub fn response_received(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Feed(_) | Self::Json(_))
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors that can occur while posting a document to the index endpoint
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Endpoint answered with a status at or above 300
    #[error("Index rejected document with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,
}

impl SubmitError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_received() {
        assert!(FetchError::Status(404).response_received());
        assert!(FetchError::Feed("bad".into()).response_received());
        assert!(!FetchError::Timeout.response_received());
        assert!(!FetchError::InvalidUrl("x".into()).response_received());
    }

    #[test]
    fn test_rejected_display() {
        let err = SubmitError::Rejected {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "Index rejected document with status 502: bad gateway"
        );
    }
}
