//! Error types for collection operations.

use thiserror::Error;

/// Errors raised by collection operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectionError {
    /// The collection has no URL to fetch from or create against.
    #[error("Collection '{name}' has no URL")]
    MissingUrl { name: String },

    /// The collection has no transport.
    #[error("Collection '{name}' has no transport configured")]
    NoTransport { name: String },

    /// A fetch response could not be turned into a list of items.
    #[error("Invalid payload for collection '{name}': expected {expected}, got {actual}")]
    InvalidPayload {
        name: String,
        expected: &'static str,
        actual: String,
    },
}

impl CollectionError {
    /// Check if this error stems from caller misuse.
    pub fn is_usage_error(&self) -> bool {
        true
    }

    /// Check if this error is a missing URL.
    pub fn is_missing_url(&self) -> bool {
        matches!(self, CollectionError::MissingUrl { .. })
    }

    /// Name of the collection this error refers to.
    pub fn name(&self) -> &str {
        match self {
            CollectionError::MissingUrl { name }
            | CollectionError::NoTransport { name }
            | CollectionError::InvalidPayload { name, .. } => name,
        }
    }
}

impl From<CollectionError> for crate::Error {
    fn from(err: CollectionError) -> Self {
        crate::Error::Collection(err)
    }
}
