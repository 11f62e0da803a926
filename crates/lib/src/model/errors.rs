//! Error types for model operations.

use thiserror::Error;

/// Errors raised by model operations.
///
/// All of these describe caller misuse; remote failures surface as transport errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Neither the model nor its collection provides a URL.
    #[error("Model '{cid}' has no URL: set a url root or add it to a collection with a url")]
    MissingUrl { cid: String },

    /// Neither the model nor its collection has a transport.
    #[error("Model '{cid}' has no transport configured")]
    NoTransport { cid: String },

    /// A response or constructor payload could not be turned into attributes.
    #[error("Invalid payload for {schema}: expected {expected}, got {actual}")]
    InvalidPayload {
        schema: String,
        expected: &'static str,
        actual: String,
    },
}

impl ModelError {
    /// Check if this error stems from caller misuse.
    pub fn is_usage_error(&self) -> bool {
        true
    }

    /// Check if this error is a missing URL.
    pub fn is_missing_url(&self) -> bool {
        matches!(self, ModelError::MissingUrl { .. })
    }

    /// Check if this error is a payload shape error.
    pub fn is_payload_error(&self) -> bool {
        matches!(self, ModelError::InvalidPayload { .. })
    }

    /// The client id of the model this error refers to, if any.
    pub fn cid(&self) -> Option<&str> {
        match self {
            ModelError::MissingUrl { cid } | ModelError::NoTransport { cid } => Some(cid),
            ModelError::InvalidPayload { .. } => None,
        }
    }
}

impl From<ModelError> for crate::Error {
    fn from(err: ModelError) -> Self {
        crate::Error::Model(err)
    }
}
