//! HTTP transport implementation.
//!
//! This module provides the reqwest-backed transport used against a real
//! REST server. Relative resource URLs such as `/people/1` are resolved
//! against the configured base URL.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Method, Request, Transport, TransportError};
use crate::{
    Result,
    constants::{ENV_BASE_URL, ENV_TIMEOUT_MS},
};

/// Configuration for an [`HttpTransport`].
///
/// Deserializable so it can be embedded in an application's own config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Base URL that relative resource URLs are joined onto
    pub base_url: Option<String>,
    /// Default request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
}

impl HttpTransportConfig {
    /// Read the configuration from `RESTBIND_BASE_URL` and `RESTBIND_TIMEOUT_MS`.
    ///
    /// Unset variables leave the corresponding field at its default. A timeout that is
    /// not a number is ignored with a warning.
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_BASE_URL).ok().filter(|v| !v.is_empty());
        let timeout_ms = std::env::var(ENV_TIMEOUT_MS)
            .ok()
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(ms) => Some(ms),
                Err(e) => {
                    tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT_MS}: {e}");
                    None
                }
            });
        Self {
            base_url,
            timeout_ms,
            headers: HashMap::new(),
        }
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportBuilder {
    /// Set the base URL relative resource URLs are resolved against.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HttpTransport> {
        HttpTransport::from_config(self.config)
    }
}

/// HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<::url::Url>,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    /// Create a transport without a base URL; every resource URL must be absolute.
    pub fn new() -> Result<Self> {
        Self::from_config(HttpTransportConfig::default())
    }

    /// Start building a transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Create a transport from configuration.
    pub fn from_config(config: HttpTransportConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|raw| {
                ::url::Url::parse(raw).map_err(|e| TransportError::InvalidUrl {
                    url: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let mut client = reqwest::Client::builder();
        if let Some(ms) = config.timeout_ms {
            client = client.timeout(Duration::from_millis(ms));
        }
        let client = client
            .build()
            .map_err(|e| TransportError::Init(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            headers: config.headers,
        })
    }

    /// Resolve a resource URL to an absolute request target.
    pub fn resolve(&self, url: &str) -> Result<::url::Url> {
        let resolved = match &self.base_url {
            Some(base) => base.join(url),
            None => ::url::Url::parse(url),
        };
        resolved.map_err(|e| {
            TransportError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn transport_type(&self) -> &'static str {
        "http"
    }

    async fn send(&self, request: Request) -> Result<Value> {
        let target = self.resolve(&request.url)?;
        let url = target.to_string();

        let mut builder = self
            .client
            .request(Self::method(request.method), target)
            .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        for (name, value) in &request.options.headers {
            builder = builder.header(name, value);
        }
        if !request.options.query.is_empty() {
            builder = builder.query(&request.options.query);
        }
        if let Some(timeout) = request.options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::trace!(method = %request.method, url = %url, "Sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request {
                method: request.method.to_string(),
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request {
                method: request.method.to_string(),
                url: url.clone(),
                reason: format!("Failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                method: request.method.to_string(),
                url,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }
            .into());
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            TransportError::Decode {
                url,
                reason: e.to_string(),
            }
            .into()
        })
    }
}
