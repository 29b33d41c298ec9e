//! Error types for generation requests.

use thiserror::Error;

/// Errors returned by generation backends.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code returned by the endpoint.
        status: u16,
    },
    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
    /// The endpoint produced no images.
    #[error("no images in response")]
    EmptyResponse,
}

impl ClientError {
    /// Whether this failure is the endpoint declining to produce an image
    /// rather than a transport or decoding problem.
    pub fn is_empty_response(&self) -> bool {
        matches!(self, ClientError::EmptyResponse)
    }
}
