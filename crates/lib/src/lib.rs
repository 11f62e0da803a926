//!
//! Restbind: structured client-side state kept in sync with a REST resource.
//! This library provides the two building blocks a front-end needs to hold
//! server-backed data without a full framework.
//!
//! ## Core Concepts
//!
//! * **Models (`model::Model`)**: A single entity's attribute map, its identity (a permanent
//!   client id plus an optional server id) and the loading/error state of its own
//!   fetch, save and destroy operations.
//! * **Collections (`collection::Collection`)**: An ordered sequence of models with a dual
//!   index (client id and server id). All membership changes go through one
//!   reconciliation primitive, `set`, which adds, merges and removes in a single pass.
//! * **Transports (`transport::Transport`)**: The pluggable request layer. `HttpTransport`
//!   talks to a real server, `InMemoryTransport` replays scripted replies.
//! * **Observers (`observer::ChangeObserver`)**: A notification port invoked on every
//!   attribute, flag or membership change so a UI layer can re-render.
//!
//! Network operations never return errors to the caller. They record the outcome in an
//! [`OperationStatus`] that UI code polls after awaiting.

pub mod attributes;
pub mod collection;
pub mod constants;
pub mod model;
pub mod observer;
pub mod predicate;
pub mod status;
pub mod transport;
pub mod url_source;

pub use attributes::Attributes;
pub use collection::{AddOptions, Collection, Item, Lookup, SetOptions, WeakCollection};
pub use model::{DefaultSchema, FetchOptions, Model, ModelSchema, SaveOptions};
pub use observer::{ChangeEvent, ChangeObserver, ChangeSource, Observers};
pub use predicate::Predicate;
pub use status::{Operation, OperationStatus};
pub use transport::{InMemoryTransport, Method, RequestOptions, Transport};
#[cfg(feature = "http")]
pub use transport::http::{HttpTransport, HttpTransportConfig};
pub use url_source::UrlSource;

/// Result type used throughout the Restbind library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Restbind library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured transport errors from the transport module
    #[error(transparent)]
    Transport(transport::TransportError),

    /// Structured model errors from the model module
    #[error(transparent)]
    Model(model::ModelError),

    /// Structured collection errors from the collection module
    #[error(transparent)]
    Collection(collection::CollectionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport",
            Error::Model(_) => "model",
            Error::Collection(_) => "collection",
        }
    }

    /// Check if this error came from the transport layer (network or HTTP failure).
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this error is caller misuse rather than a remote failure.
    ///
    /// Covers unresolvable URLs, a missing transport and unusable response payloads.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Error::Transport(err) => err.is_usage_error(),
            Error::Model(err) => err.is_usage_error(),
            Error::Collection(err) => err.is_usage_error(),
        }
    }

    /// Check if the remote resource reported that it does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Transport(err) => err.status() == Some(404),
            _ => false,
        }
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }
}
