//! Error types for Data Management requests.

use thiserror::Error;

/// Errors returned by a [`DataManagement`](super::DataManagement) implementation.
#[derive(Debug, Error)]
pub enum ApsError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// APS answered with a non-success status.
    #[error("APS returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON:API document.
    #[error("Failed to decode APS response: {0}")]
    Decode(String),
}

/// Result type for Data Management requests.
pub type ApsResult<T> = Result<T, ApsError>;
