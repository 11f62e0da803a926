//! Options accepted by model and collection network operations.

use crate::transport::RequestOptions;

/// Options for fetching a model or collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Run the response through the schema's `parse` (default `true`)
    pub parse: bool,
    /// Per-call transport configuration
    pub request: RequestOptions,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            parse: true,
            request: RequestOptions::default(),
        }
    }
}

impl FetchOptions {
    /// Take the response as-is instead of running it through `parse`.
    pub fn raw() -> Self {
        Self {
            parse: false,
            ..Self::default()
        }
    }

    /// Attach per-call transport configuration.
    pub fn with_request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }
}

/// Options for saving a model or creating a collection member.
pub type SaveOptions = FetchOptions;
