//! Builder for [`Model`].

use std::sync::Arc;

use serde_json::Value;

use super::{Model, ModelSchema};
use crate::{
    Attributes, Result,
    collection::{Collection, WeakCollection},
    observer::Observers,
    transport::Transport,
    url_source::UrlSource,
};

/// Everything a model is assembled from.
pub(crate) struct Parts {
    pub(crate) schema: Arc<dyn ModelSchema>,
    pub(crate) attributes: Attributes,
    pub(crate) collection: Option<WeakCollection>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) observers: Observers,
    pub(crate) url_root: Option<UrlSource>,
}

/// Builder for models that need more than attributes.
///
/// ```
/// use restbind::{DefaultSchema, InMemoryTransport, Model};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let model = Model::builder(Arc::new(DefaultSchema))
///     .attributes(json!({"id": 3, "name": "C"}).as_object().cloned().unwrap())
///     .transport(Arc::new(InMemoryTransport::new()))
///     .url_root("/people")
///     .build()
///     .unwrap();
///
/// assert_eq!(model.url().unwrap(), "/people/3");
/// ```
pub struct ModelBuilder {
    parts: Parts,
    parse: bool,
}

impl ModelBuilder {
    pub(crate) fn new(schema: Arc<dyn ModelSchema>) -> Self {
        Self {
            parts: Parts {
                schema,
                attributes: Attributes::new(),
                collection: None,
                transport: None,
                observers: Observers::new(),
                url_root: None,
            },
            parse: false,
        }
    }

    /// Initial attributes, laid over the schema defaults.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.parts.attributes = attributes;
        self
    }

    /// Owning collection for the back-reference.
    pub fn collection(mut self, collection: &Collection) -> Self {
        self.parts.collection = Some(collection.downgrade());
        self
    }

    /// Pass the initial attributes through the schema's `parse` first.
    pub fn parse(mut self, parse: bool) -> Self {
        self.parse = parse;
        self
    }

    /// Transport used for this model's network operations.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.parts.transport = Some(transport);
        self
    }

    /// Observer registry notified by this model.
    pub fn observers(mut self, observers: Observers) -> Self {
        self.parts.observers = observers;
        self
    }

    /// Instance-level url root, overriding the schema's.
    pub fn url_root(mut self, url_root: impl Into<UrlSource>) -> Self {
        self.parts.url_root = Some(url_root.into());
        self
    }

    /// Build the model.
    ///
    /// Fails only when `parse` is enabled and the schema rejects the attributes.
    pub fn build(mut self) -> Result<Model> {
        if self.parse {
            let raw = std::mem::take(&mut self.parts.attributes);
            self.parts.attributes = self.parts.schema.parse(Value::Object(raw))?;
        }
        Ok(Model::from_parts(self.parts))
    }
}
