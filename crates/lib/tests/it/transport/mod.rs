//! Transport integration tests
//!
//! `HttpTransport` end to end against a local axum server, and transport
//! configuration.

#[cfg(feature = "http")]
mod config;
#[cfg(feature = "http")]
mod http;
