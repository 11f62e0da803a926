//! Builder for [`Collection`].

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use serde_json::Value;

use super::{Collection, CollectionInternal, CollectionState, Item, Parser};
use crate::{
    Result,
    constants::DEFAULT_COLLECTION_NAME,
    model::{DefaultSchema, ModelSchema},
    observer::Observers,
    transport::Transport,
    url_source::UrlSource,
};

/// Builder for collections.
///
/// ```
/// use restbind::{Collection, InMemoryTransport};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let people = Collection::builder()
///     .name("People")
///     .url("/people")
///     .transport(Arc::new(InMemoryTransport::new()))
///     .models(vec![json!({"id": 1}), json!({"id": 2})])
///     .build();
///
/// assert_eq!(people.len(), 2);
/// assert_eq!(people.get(2).unwrap().url().unwrap(), "/people/2");
/// ```
pub struct CollectionBuilder {
    name: String,
    schema: Arc<dyn ModelSchema>,
    url: Option<UrlSource>,
    parser: Option<Parser>,
    transport: Option<Arc<dyn Transport>>,
    observers: Observers,
    models: Vec<Item>,
}

impl Default for CollectionBuilder {
    fn default() -> Self {
        Self {
            name: DEFAULT_COLLECTION_NAME.to_string(),
            schema: Arc::new(DefaultSchema),
            url: None,
            parser: None,
            transport: None,
            observers: Observers::new(),
            models: Vec::new(),
        }
    }
}

impl CollectionBuilder {
    /// Name reported in logs, errors and change events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Entity type of the models the collection creates from raw attributes.
    pub fn schema(mut self, schema: Arc<dyn ModelSchema>) -> Self {
        self.schema = schema;
        self
    }

    /// URL of the list resource.
    pub fn url(mut self, url: impl Into<UrlSource>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Custom conversion of fetch responses into item lists.
    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(Value) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Transport shared with every model the collection creates.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Observer registry shared with every model the collection creates.
    pub fn observers(mut self, observers: Observers) -> Self {
        self.observers = observers;
        self
    }

    /// Initial members.
    pub fn models<I>(mut self, models: impl IntoIterator<Item = I>) -> Self
    where
        I: Into<Item>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Build the collection, loading the initial members if any.
    pub fn build(self) -> Collection {
        let collection = Collection {
            inner: Arc::new(CollectionInternal {
                name: self.name,
                schema: self.schema,
                parser: self.parser,
                transport: self.transport,
                observers: self.observers,
                state: RwLock::new(CollectionState {
                    models: Vec::new(),
                    by_id: HashMap::new(),
                    server_keys: HashMap::new(),
                    url: self.url,
                    statuses: HashMap::new(),
                }),
                requests: tokio::sync::Mutex::new(()),
            }),
        };
        if !self.models.is_empty() {
            collection.reset(self.models);
        }
        collection
    }
}
