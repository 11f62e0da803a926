//! Error types for the transport module.

use thiserror::Error;

/// Errors raised by a transport while performing a request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("{method} {url} failed: {reason}")]
    Request {
        method: String,
        url: String,
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The URL could not be turned into a request target.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No scripted reply exists for this request.
    #[error("No route for {method} {url}")]
    Unrouted { method: String, url: String },

    /// Transport construction failed.
    #[error("Failed to initialize transport: {0}")]
    Init(String),
}

impl TransportError {
    /// HTTP status code of a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a network/connection error.
    pub fn is_network_error(&self) -> bool {
        matches!(self, TransportError::Request { .. })
    }

    /// Check if the server rejected the request.
    pub fn is_status_error(&self) -> bool {
        matches!(self, TransportError::Status { .. })
    }

    /// Check if this error stems from how the request was built rather than the remote side.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            TransportError::InvalidUrl { .. } | TransportError::Init(_)
        )
    }

    /// The URL this error refers to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            TransportError::Request { url, .. }
            | TransportError::Status { url, .. }
            | TransportError::Decode { url, .. }
            | TransportError::InvalidUrl { url, .. }
            | TransportError::Unrouted { url, .. } => Some(url),
            TransportError::Init(_) => None,
        }
    }
}

impl From<TransportError> for crate::Error {
    fn from(err: TransportError) -> Self {
        crate::Error::Transport(err)
    }
}
