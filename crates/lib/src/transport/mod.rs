//! Transport abstractions for talking to the remote resource.
//!
//! This module defines the transport trait that request implementations must
//! implement, allowing models and collections to sync over a real HTTP client
//! or over a scripted in-memory stub.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

pub mod errors;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;

pub use errors::TransportError;
pub use memory::InMemoryTransport;

/// The HTTP verbs used by models and collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// The verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call request configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Extra headers sent with the request
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL
    pub query: Vec<(String, String)>,
    /// Overrides the transport's default timeout
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty request options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A single request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

impl Request {
    /// Create a request without a body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach per-call options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Trait for implementing the request/response exchange with the remote resource.
///
/// Implementations return the parsed response body, or an error for network and
/// HTTP failures. They are the only place a timeout is enforced.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport type identifier (e.g. "http", "memory").
    fn transport_type(&self) -> &'static str;

    /// Perform a request and return the parsed response body.
    async fn send(&self, request: Request) -> Result<Value>;

    /// Issue a GET.
    async fn get(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.send(Request::new(Method::Get, url).with_options(options))
            .await
    }

    /// Issue a POST with a JSON body.
    async fn post(&self, url: &str, body: Value, options: RequestOptions) -> Result<Value> {
        self.send(
            Request::new(Method::Post, url)
                .with_body(body)
                .with_options(options),
        )
        .await
    }

    /// Issue a PATCH with a JSON body.
    async fn patch(&self, url: &str, body: Value, options: RequestOptions) -> Result<Value> {
        self.send(
            Request::new(Method::Patch, url)
                .with_body(body)
                .with_options(options),
        )
        .await
    }

    /// Issue a DELETE.
    async fn delete(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.send(Request::new(Method::Delete, url).with_options(options))
            .await
    }
}
