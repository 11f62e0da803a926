//! Scripted in-memory transport.
//!
//! Replies are registered per (method, url) and replayed for every matching
//! request. Every request is recorded so callers can assert on what was sent.
//! Useful for tests and for running the data layer without a server.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use super::{Method, Request, Transport, TransportError};
use crate::Result;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status { status: u16, body: String },
    Disconnect(String),
}

/// Transport answering from a table of scripted replies.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<Request>>,
    latency: Option<Duration>,
}

impl InMemoryTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, so in-flight state can be observed.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn route(&self, method: Method, url: impl Into<String>, reply: Reply) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, url.into()), reply);
    }

    /// Answer `method url` with a JSON body.
    pub fn reply(&self, method: Method, url: impl Into<String>, body: Value) {
        self.route(method, url, Reply::Json(body));
    }

    /// Answer `method url` with a non-success status.
    pub fn fail(&self, method: Method, url: impl Into<String>, status: u16) {
        self.route(
            method,
            url,
            Reply::Status {
                status,
                body: String::new(),
            },
        );
    }

    /// Make `method url` fail as if the connection dropped.
    pub fn disconnect(&self, method: Method, url: impl Into<String>) {
        self.route(method, url, Reply::Disconnect("connection reset".to_string()));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    fn transport_type(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, request: Request) -> Result<Value> {
        let key = (request.method, request.url.clone());
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let reply = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let (method, url) = key;
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status { status, body }) => Err(TransportError::Status {
                method: method.to_string(),
                url,
                status,
                body,
            }
            .into()),
            Some(Reply::Disconnect(reason)) => Err(TransportError::Request {
                method: method.to_string(),
                url,
                reason,
            }
            .into()),
            None => Err(TransportError::Unrouted {
                method: method.to_string(),
                url,
            }
            .into()),
        }
    }
}
