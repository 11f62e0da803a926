//!
//! Provides the single-entity wrapper (`Model`).
//!
//! A model owns one entity's attributes, its identity (a permanent client id and an
//! optional server id) and the async state of its own fetch, save and destroy
//! operations. It may belong to at most one collection through a non-owning
//! back-reference used for URL fallback and removal on destroy.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use handle_trait::Handle;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    Attributes, Result,
    attributes::{self, index_key},
    collection::{Collection, WeakCollection},
    observer::{ChangeEvent, ChangeSource, Observers},
    status::{self, Operation, OperationStatus, StatusTarget},
    transport::{RequestOptions, Transport},
    url_source::{UrlSource, join_id},
};

mod builder;
pub mod errors;
mod options;
pub mod schema;

pub use builder::ModelBuilder;
pub(crate) use builder::Parts;
pub use errors::ModelError;
pub use options::{FetchOptions, SaveOptions};
pub use schema::{DefaultSchema, ModelSchema, payload_attributes};


static NEXT_CID: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique client id. The counter is shared by all prefixes.
pub(crate) fn next_cid(prefix: &str) -> String {
    let n = NEXT_CID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{n}")
}

/// Outcome of merging attributes into a model.
#[derive(Debug, Default)]
pub(crate) struct Applied {
    /// One event per written key
    pub(crate) events: Vec<ChangeEvent>,
    /// Value each written key held before the write (`None` if absent)
    pub(crate) previous: HashMap<String, Option<Value>>,
}

impl Applied {
    /// Check if the write included `attribute`.
    pub(crate) fn touches(&self, attribute: &str) -> bool {
        self.previous.contains_key(attribute)
    }
}

pub(crate) struct ModelState {
    attributes: Attributes,
    id: Option<Value>,
    url_root: Option<UrlSource>,
    collection: Option<WeakCollection>,
    /// Collections that currently index this model, back-reference target or not.
    memberships: Vec<WeakCollection>,
    statuses: HashMap<Operation, OperationStatus>,
}

/// Internal state for Model
///
/// Model itself is just a cheap-to-clone handle wrapping `Arc<ModelInternal>`.
pub(crate) struct ModelInternal {
    cid: String,
    schema: Arc<dyn ModelSchema>,
    transport: Option<Arc<dyn Transport>>,
    observers: Observers,
    state: RwLock<ModelState>,
    /// Serialises this model's network operations.
    requests: tokio::sync::Mutex<()>,
}

impl StatusTarget for ModelInternal {
    fn update_status(&self, op: Operation, update: &mut dyn FnMut(&mut OperationStatus)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        update(state.statuses.entry(op).or_default());
    }

    fn change_source(&self) -> ChangeSource {
        ChangeSource::Model {
            cid: self.cid.clone(),
        }
    }

    fn status_observers(&self) -> &Observers {
        &self.observers
    }
}

/// A single entity synchronised with a remote resource.
///
/// Model is a cheap-to-clone handle: clones (and `handle()`) refer to the same entity.
/// Use [`Model::duplicate`] for an independent copy and [`Model::ptr_eq`] for identity.
///
/// ## Example
///
/// ```
/// use restbind::{Attributes, Model};
/// use serde_json::json;
///
/// let model = Model::new(Attributes::new());
/// assert!(model.is_new());
///
/// let mut attrs = Attributes::new();
/// attrs.insert("id".to_string(), json!(1));
/// attrs.insert("name".to_string(), json!("A"));
/// model.set(attrs);
///
/// assert_eq!(model.id(), Some(json!(1)));
/// assert_eq!(model.get("name"), Some(json!("A")));
/// assert!(!model.is_new());
/// ```
#[derive(Clone, Handle)]
pub struct Model {
    inner: Arc<ModelInternal>,
}

impl Model {
    /// Create a model of the base entity type.
    pub fn new(attributes: Attributes) -> Self {
        Self::with_schema(Arc::new(DefaultSchema), attributes)
    }

    /// Create a model of the given entity type.
    pub fn with_schema(schema: Arc<dyn ModelSchema>, attributes: Attributes) -> Self {
        Self::from_parts(Parts {
            schema,
            attributes,
            collection: None,
            transport: None,
            observers: Observers::new(),
            url_root: None,
        })
    }

    /// Start building a model of the given entity type.
    pub fn builder(schema: Arc<dyn ModelSchema>) -> ModelBuilder {
        ModelBuilder::new(schema)
    }

    /// Assemble a model: defaults first, constructor attributes laid over them.
    pub(crate) fn from_parts(parts: builder::Parts) -> Self {
        let cid = next_cid(parts.schema.cid_prefix());
        let attributes = attributes::merged(&parts.schema.defaults(), &parts.attributes);
        let id = attributes
            .get(parts.schema.id_attribute())
            .filter(|v| !v.is_null())
            .cloned();

        Self {
            inner: Arc::new(ModelInternal {
                cid,
                schema: parts.schema,
                transport: parts.transport,
                observers: parts.observers,
                state: RwLock::new(ModelState {
                    attributes,
                    id,
                    url_root: parts.url_root,
                    collection: parts.collection,
                    memberships: Vec::new(),
                    statuses: HashMap::new(),
                }),
                requests: tokio::sync::Mutex::new(()),
            }),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, ModelState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ModelState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The client id: assigned at construction, unique within the process, never reused.
    pub fn cid(&self) -> &str {
        &self.inner.cid
    }

    /// The entity type of this model.
    pub fn schema(&self) -> &Arc<dyn ModelSchema> {
        &self.inner.schema
    }

    /// The change observers notified by this model.
    pub fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    /// The server id, present once the entity has been persisted.
    pub fn id(&self) -> Option<Value> {
        self.state().id.clone()
    }

    /// Check if two handles refer to the same model.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Value of an attribute, or `None` if absent.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.state().attributes.get(name).cloned()
    }

    /// True if the attribute is present and not `null`.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    /// Snapshot of all attributes.
    pub fn attributes(&self) -> Attributes {
        self.state().attributes.clone()
    }

    /// Shallow copy of the attributes, suitable for serialisation.
    pub fn to_json(&self) -> Attributes {
        self.attributes()
    }

    /// Merge attributes into the model, last write winning per key.
    ///
    /// Observers receive one event per key. When the id attribute is written, every
    /// collection holding this model re-indexes it under the new id.
    pub fn set(&self, attributes: Attributes) {
        let applied = self.apply(attributes);
        if applied.events.is_empty() {
            return;
        }
        if applied.touches(self.inner.schema.id_attribute()) {
            self.reindex_memberships(None);
        }
        self.inner.observers.emit_all(applied.events);
    }

    /// Re-index this model in every collection holding it, except `skip`.
    pub(crate) fn reindex_memberships(&self, skip: Option<&WeakCollection>) {
        for collection in self.memberships() {
            if skip.is_some_and(|weak| weak.points_to(&collection)) {
                continue;
            }
            collection.reindex(self);
        }
    }

    fn memberships(&self) -> Vec<Collection> {
        self.state()
            .memberships
            .iter()
            .filter_map(WeakCollection::upgrade)
            .collect()
    }

    /// Record that `collection` indexes this model.
    pub(crate) fn join(&self, collection: &WeakCollection) {
        let mut state = self.state_mut();
        if !state.memberships.iter().any(|weak| weak.ptr_eq(collection)) {
            state.memberships.push(collection.clone());
        }
    }

    /// Forget `collection`, also pruning collections that no longer exist.
    pub(crate) fn leave(&self, collection: &WeakCollection) {
        self.state_mut()
            .memberships
            .retain(|weak| !weak.ptr_eq(collection) && weak.upgrade().is_some());
    }

    /// Write attributes without notifying anyone; the caller delivers the events.
    pub(crate) fn apply(&self, attributes: Attributes) -> Applied {
        let id_attribute = self.inner.schema.id_attribute();
        let source = ChangeSource::Model {
            cid: self.inner.cid.clone(),
        };
        let mut applied = Applied::default();
        let mut state = self.state_mut();

        let touches_id = attributes.contains_key(id_attribute);
        for (key, value) in attributes {
            applied
                .events
                .push(ChangeEvent::new(source.clone(), key.clone(), value.clone()));
            let previous = state.attributes.insert(key.clone(), value);
            applied.previous.entry(key).or_insert(previous);
        }
        if touches_id {
            state.id = state
                .attributes
                .get(id_attribute)
                .filter(|v| !v.is_null())
                .cloned();
        }
        applied
    }

    /// Keys of `other` whose values differ from the current attributes.
    ///
    /// Returns `None` when nothing differs; used for dirty-checking before a save.
    pub fn compare_attributes(&self, other: &Attributes) -> Option<Attributes> {
        attributes::diff(&self.state().attributes, other)
    }

    /// True until the id attribute holds a non-null value.
    pub fn is_new(&self) -> bool {
        !self.has(self.inner.schema.id_attribute())
    }

    /// Override the schema's url root for this instance.
    pub fn set_url_root(&self, url_root: Option<UrlSource>) {
        self.state_mut().url_root = url_root;
    }

    /// The URL models of this kind live under.
    ///
    /// Uses this model's url root (instance override, then schema), falling back to the
    /// owning collection's url.
    pub fn base_url(&self) -> Result<String> {
        let instance_root = self.state().url_root.clone();
        let own = instance_root
            .or_else(|| self.inner.schema.url_root())
            .and_then(|source| source.resolve());
        if let Some(url) = own {
            return Ok(url);
        }
        self.collection()
            .and_then(|collection| collection.url())
            .ok_or_else(|| {
                ModelError::MissingUrl {
                    cid: self.inner.cid.clone(),
                }
                .into()
            })
    }

    /// The REST URL of this model: the base url when new, otherwise `<base>/<id>`.
    pub fn url(&self) -> Result<String> {
        let base = self.base_url()?;
        let id = self
            .get(self.inner.schema.id_attribute())
            .as_ref()
            .and_then(index_key);
        match id {
            Some(id) => Ok(join_id(&base, &id)),
            None => Ok(base),
        }
    }

    /// The owning collection, if any and still alive.
    pub fn collection(&self) -> Option<Collection> {
        self.state()
            .collection
            .as_ref()
            .and_then(WeakCollection::upgrade)
    }

    /// Check if this model's back-reference points at `collection`.
    pub fn belongs_to(&self, collection: &Collection) -> bool {
        self.state()
            .collection
            .as_ref()
            .is_some_and(|weak| weak.points_to(collection))
    }

    pub(crate) fn set_collection(&self, collection: Option<WeakCollection>) {
        self.state_mut().collection = collection;
    }

    /// Clear the back-reference if it points at `collection`.
    pub(crate) fn detach_from(&self, collection: &WeakCollection) {
        let mut state = self.state_mut();
        if state
            .collection
            .as_ref()
            .is_some_and(|weak| weak.ptr_eq(collection))
        {
            state.collection = None;
        }
    }

    /// The transport used for network operations: this model's own, else its collection's.
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.inner
            .transport
            .clone()
            .or_else(|| self.collection().and_then(|c| c.transport()))
    }

    fn require_transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport().ok_or_else(|| {
            ModelError::NoTransport {
                cid: self.inner.cid.clone(),
            }
            .into()
        })
    }

    /// A new model of the same entity type with a copy of the attributes.
    ///
    /// The copy gets a fresh cid and keeps this model's collection back-reference,
    /// transport and observers.
    pub fn duplicate(&self) -> Model {
        let collection = self.state().collection.clone();
        self.duplicate_with(collection)
    }

    /// Like [`Model::duplicate`], with the back-reference replaced by `collection`.
    pub fn duplicate_into(&self, collection: Option<&Collection>) -> Model {
        self.duplicate_with(collection.map(Collection::downgrade))
    }

    fn duplicate_with(&self, collection: Option<WeakCollection>) -> Model {
        let state = self.state();
        let parts = Parts {
            schema: self.inner.schema.clone(),
            attributes: state.attributes.clone(),
            collection,
            transport: self.inner.transport.clone(),
            observers: self.inner.observers.handle(),
            url_root: state.url_root.clone(),
        };
        drop(state);
        Model::from_parts(parts)
    }

    fn status(&self, op: Operation) -> OperationStatus {
        self.state().statuses.get(&op).cloned().unwrap_or_default()
    }

    /// State of the most recent fetch.
    pub fn fetch_status(&self) -> OperationStatus {
        self.status(Operation::Fetch)
    }

    /// State of the most recent save.
    pub fn save_status(&self) -> OperationStatus {
        self.status(Operation::Save)
    }

    /// State of the most recent destroy.
    pub fn delete_status(&self) -> OperationStatus {
        self.status(Operation::Delete)
    }

    pub fn fetch_loading(&self) -> bool {
        self.fetch_status().is_loading()
    }

    pub fn fetch_error(&self) -> Option<Arc<crate::Error>> {
        self.fetch_status().error()
    }

    pub fn save_loading(&self) -> bool {
        self.save_status().is_loading()
    }

    pub fn save_error(&self) -> Option<Arc<crate::Error>> {
        self.save_status().error()
    }

    pub fn delete_loading(&self) -> bool {
        self.delete_status().is_loading()
    }

    pub fn delete_error(&self) -> Option<Arc<crate::Error>> {
        self.delete_status().error()
    }

    fn parse_response(&self, data: Value, parse: bool) -> Result<Attributes> {
        if parse {
            self.inner.schema.parse(data)
        } else {
            payload_attributes(self.inner.schema.name(), data)
        }
    }

    /// Fetch the model from the server and merge the response into the attributes.
    ///
    /// Never fails: the outcome is recorded in [`Model::fetch_status`].
    pub async fn fetch(&self, options: FetchOptions) {
        let _gate = self.inner.requests.lock().await;
        tracing::debug!(model = self.inner.schema.name(), cid = %self.inner.cid, "fetch");

        status::track(&*self.inner, Operation::Fetch, async {
            let transport = self.require_transport()?;
            let url = self.url()?;
            let data = transport.get(&url, options.request).await?;
            let attributes = self.parse_response(data, options.parse)?;
            self.set(attributes);
            Ok(())
        })
        .await;
    }

    /// Merge `attributes` and sync the model to the server.
    ///
    /// New models POST all attributes (current merged with `attributes`); persisted
    /// models PATCH only `attributes`. The server response is laid over the supplied
    /// attributes, so server values win on conflicting keys, and the result is `set`.
    ///
    /// Never fails: the outcome is recorded in [`Model::save_status`].
    pub async fn save(&self, attributes: Option<Attributes>, options: SaveOptions) {
        let _gate = self.inner.requests.lock().await;
        tracing::debug!(model = self.inner.schema.name(), cid = %self.inner.cid, "save");

        status::track(&*self.inner, Operation::Save, async {
            let transport = self.require_transport()?;
            let url = self.url()?;
            let changes = attributes.unwrap_or_default();

            let data = if self.is_new() {
                let body = attributes::merged(&self.attributes(), &changes);
                transport
                    .post(&url, Value::Object(body), options.request)
                    .await?
            } else {
                transport
                    .patch(&url, Value::Object(changes.clone()), options.request)
                    .await?
            };

            let server = self.parse_response(data, options.parse)?;
            self.set(attributes::merged(&changes, &server));
            Ok(())
        })
        .await;
    }

    /// Delete the model on the server, then remove it from its collection.
    ///
    /// Removal happens only after the server confirmed the deletion. Never fails: the
    /// outcome is recorded in [`Model::delete_status`].
    pub async fn destroy(&self, options: RequestOptions) {
        let _gate = self.inner.requests.lock().await;
        tracing::debug!(model = self.inner.schema.name(), cid = %self.inner.cid, "destroy");

        status::track(&*self.inner, Operation::Delete, async {
            let transport = self.require_transport()?;
            let url = self.url()?;
            transport.delete(&url, options).await?;

            if let Some(collection) = self.collection() {
                collection.remove_one(self);
            }
            Ok(())
        })
        .await;
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Model")
            .field("schema", &self.inner.schema.name())
            .field("cid", &self.inner.cid)
            .field("id", &state.id)
            .field("attributes", &state.attributes)
            .field("in_collection", &state.collection.is_some())
            .finish()
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.state().attributes.serialize(serializer)
    }
}
