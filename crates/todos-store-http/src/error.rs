//! Error types for remote store operations.

use thiserror::Error;

/// Errors that can occur while talking to the remote `/todos` collection.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The configured base URL cannot host the collection path.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Network or protocol failure before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{method} {url} failed with HTTP {status}: {body}")]
    Status {
        /// HTTP method of the failed request.
        method: String,
        /// Request URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Response body (possibly empty).
        body: String,
    },

    /// The response body is not the expected JSON document.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl StoreError {
    /// HTTP status of the failure, when the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
