//! Lazily resolved resource URLs.

use std::{fmt, sync::Arc};

/// Producer type for URLs computed at call time.
pub type UrlProducer = Arc<dyn Fn() -> String + Send + Sync>;

/// Where a resource URL comes from.
///
/// A URL is either a literal string or a zero-argument producer evaluated on every
/// operation (never cached), so it can depend on state that changes after setup.
#[derive(Clone)]
pub enum UrlSource {
    Static(String),
    Dynamic(UrlProducer),
}

impl UrlSource {
    /// Build a source from a producer closure.
    pub fn dynamic<F>(producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        UrlSource::Dynamic(Arc::new(producer))
    }

    /// Evaluate the source.
    ///
    /// Empty strings resolve to `None`: an empty URL is treated the same as no URL.
    pub fn resolve(&self) -> Option<String> {
        let url = match self {
            UrlSource::Static(url) => url.clone(),
            UrlSource::Dynamic(producer) => producer(),
        };
        if url.is_empty() { None } else { Some(url) }
    }
}

impl fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::Static(url) => f.debug_tuple("Static").field(url).finish(),
            UrlSource::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for UrlSource {
    fn from(url: &str) -> Self {
        UrlSource::Static(url.to_string())
    }
}

impl From<String> for UrlSource {
    fn from(url: String) -> Self {
        UrlSource::Static(url)
    }
}

/// Append an id segment to a base URL, inserting a `/` unless the base is empty or
/// already ends with one.
pub fn join_id(base: &str, id: &str) -> String {
    if base.is_empty() || base.ends_with('/') {
        format!("{base}{id}")
    } else {
        format!("{base}/{id}")
    }
}
