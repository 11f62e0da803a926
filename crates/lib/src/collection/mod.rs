//!
//! Provides the ordered, uniquely-indexed aggregate of models (`Collection`).
//!
//! A collection keeps its members in insertion order and indexes each one under its
//! client id and, once known, its server id. All membership changes go through one
//! reconciliation primitive ([`Collection::set`]); `add`, `reset` and `fetch` are thin
//! wrappers around it.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
};

use handle_trait::Handle;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use serde_json::Value;

use crate::{
    Attributes, Model, Result,
    attributes::index_key,
    constants::{CID_ATTRIBUTE, LENGTH_KEY, MODELS_KEY},
    model::{FetchOptions, ModelSchema, SaveOptions, payload_attributes, schema::json_kind},
    observer::{ChangeEvent, ChangeSource, Observers},
    predicate::Predicate,
    status::{self, Operation, OperationStatus, StatusTarget},
    transport::Transport,
    url_source::UrlSource,
};

mod builder;
pub mod errors;
mod iter;
mod lookup;
mod set;

pub use builder::CollectionBuilder;
pub use errors::CollectionError;
pub use iter::{Entries, Keys, Values};
pub use lookup::{Item, Lookup};
pub use set::{AddOptions, SetOptions};


/// Converts a raw fetch response into the list of items to load.
pub type Parser = Arc<dyn Fn(Value) -> Result<Vec<Value>> + Send + Sync>;

/// Take a fetch payload as a list of items.
///
/// Arrays are used as-is and `null` becomes an empty list.
pub fn payload_list(name: &str, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(CollectionError::InvalidPayload {
            name: name.to_string(),
            expected: "a JSON array",
            actual: json_kind(&other).to_string(),
        }
        .into()),
    }
}

pub(crate) struct CollectionState {
    models: Vec<Model>,
    /// Members keyed by cid and by server id; both share one keyspace.
    by_id: HashMap<String, Model>,
    /// Server key each member is indexed under, by cid.
    server_keys: HashMap<String, String>,
    url: Option<UrlSource>,
    statuses: HashMap<Operation, OperationStatus>,
}

impl CollectionState {
    fn contains(&self, model: &Model) -> bool {
        self.by_id
            .get(model.cid())
            .is_some_and(|member| member.ptr_eq(model))
    }

    fn index_of(&self, model: &Model) -> Option<usize> {
        self.models.iter().position(|member| member.ptr_eq(model))
    }

    /// Index hit on `key`.
    ///
    /// A server-key hit only counts while it is still the key the member is indexed
    /// under.
    fn lookup(&self, key: &str) -> Option<&Model> {
        let model = self.by_id.get(key)?;
        if model.cid() == key || self.server_keys.get(model.cid()).is_some_and(|k| k == key) {
            Some(model)
        } else {
            None
        }
    }
}

/// Internal state for Collection
///
/// Collection itself is just a cheap-to-clone handle wrapping `Arc<CollectionInternal>`.
pub(crate) struct CollectionInternal {
    name: String,
    schema: Arc<dyn ModelSchema>,
    parser: Option<Parser>,
    transport: Option<Arc<dyn Transport>>,
    observers: Observers,
    state: RwLock<CollectionState>,
    /// Serialises this collection's network operations.
    requests: tokio::sync::Mutex<()>,
}

impl CollectionInternal {
    fn source(&self) -> ChangeSource {
        ChangeSource::Collection {
            name: self.name.clone(),
        }
    }
}

impl StatusTarget for CollectionInternal {
    fn update_status(&self, op: Operation, update: &mut dyn FnMut(&mut OperationStatus)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        update(state.statuses.entry(op).or_default());
    }

    fn change_source(&self) -> ChangeSource {
        self.source()
    }

    fn status_observers(&self) -> &Observers {
        &self.observers
    }
}

/// Change events collected under the lock and delivered after it is released.
#[derive(Default)]
pub(crate) struct Pending {
    model_events: Vec<(Observers, Vec<ChangeEvent>)>,
    /// Merged members whose id changed; other collections holding them re-index later.
    rekeyed: Vec<Model>,
    /// Set when the member sequence changed.
    membership_changed: bool,
}

impl Pending {
    fn notify(&mut self, observers: &Observers, events: Vec<ChangeEvent>) {
        if !events.is_empty() {
            self.model_events.push((observers.handle(), events));
        }
    }
}

/// Check if two member sequences hold the same models in the same order.
fn same_members(a: &[Model], b: &[Model]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ptr_eq(y))
}

/// An ordered set of models kept in sync with a remote list resource.
///
/// Collection is a cheap-to-clone handle: clones (and `handle()`) refer to the same
/// collection. Models hold only a [`WeakCollection`] back to it.
///
/// ## Example
///
/// ```
/// use restbind::{Collection, SetOptions};
/// use serde_json::json;
///
/// let people = Collection::new();
/// people.add(vec![json!({"id": 1, "name": "A"}), json!({"id": 2, "name": "B"})]);
/// assert_eq!(people.len(), 2);
///
/// // Merge into the existing member, drop the one missing from the input
/// people.set(vec![json!({"id": 1, "name": "Z"})], SetOptions::default());
/// assert_eq!(people.len(), 1);
/// assert_eq!(people.get(1).unwrap().get("name"), Some(json!("Z")));
/// ```
#[derive(Clone, Handle)]
pub struct Collection {
    inner: Arc<CollectionInternal>,
}

/// Non-owning reference to a [`Collection`].
///
/// Stored by models as their back-reference; it never keeps the collection alive.
#[derive(Clone)]
pub struct WeakCollection {
    inner: Weak<CollectionInternal>,
}

impl WeakCollection {
    /// The collection, if it is still alive.
    pub fn upgrade(&self) -> Option<Collection> {
        self.inner.upgrade().map(|inner| Collection { inner })
    }

    /// Check if this reference points at `collection`.
    pub fn points_to(&self, collection: &Collection) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(&collection.inner))
    }

    /// Check if two references point at the same collection.
    pub fn ptr_eq(&self, other: &WeakCollection) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for WeakCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCollection")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Create an empty collection of base entities.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a collection.
    pub fn builder() -> CollectionBuilder {
        CollectionBuilder::default()
    }

    fn state(&self) -> RwLockReadGuard<'_, CollectionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, CollectionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Name used in logs, errors and change events.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Entity type of the members this collection creates.
    pub fn schema(&self) -> &Arc<dyn ModelSchema> {
        &self.inner.schema
    }

    /// The change observers notified by this collection and the models it creates.
    pub fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    /// The transport used for network operations.
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.inner.transport.clone()
    }

    /// A non-owning reference to this collection.
    pub fn downgrade(&self) -> WeakCollection {
        WeakCollection {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Check if two handles refer to the same collection.
    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The server id held in `attributes`, read from the element schema's id attribute.
    pub fn model_id(&self, attributes: &Attributes) -> Option<Value> {
        attributes
            .get(self.inner.schema.id_attribute())
            .filter(|v| !v.is_null())
            .cloned()
    }

    fn id_key(&self, attributes: &Attributes) -> Option<String> {
        attributes
            .get(self.inner.schema.id_attribute())
            .and_then(index_key)
    }

    fn model_key(&self, model: &Model) -> Option<String> {
        model
            .get(self.inner.schema.id_attribute())
            .as_ref()
            .and_then(index_key)
    }

    /// Resolve a lookup against the index.
    ///
    /// Keys hit the index directly; attributes and models are tried by their server id,
    /// then by their cid. Returns `None` when nothing matches.
    pub fn get(&self, lookup: impl Into<Lookup>) -> Option<Model> {
        let lookup = lookup.into();
        let state = self.state();
        self.resolve(&state, &lookup)
    }

    /// Index hit on an id or cid.
    pub fn by_key(&self, key: &str) -> Option<Model> {
        self.state().lookup(key).cloned()
    }

    /// Member whose server id equals the one held in `attributes`.
    pub fn by_server_id(&self, attributes: &Attributes) -> Option<Model> {
        let key = self.id_key(attributes)?;
        self.by_key(&key)
    }

    /// Member with the given client id.
    pub fn by_cid(&self, cid: &str) -> Option<Model> {
        self.by_key(cid)
    }

    fn resolve(&self, state: &CollectionState, lookup: &Lookup) -> Option<Model> {
        match lookup {
            Lookup::Key(key) => state.lookup(key).cloned(),
            Lookup::Attributes(attributes) => self.resolve_attributes(state, attributes),
            Lookup::Model(model) => self.resolve_model(state, model),
        }
    }

    fn resolve_item(&self, state: &CollectionState, item: &Item) -> Option<Model> {
        match item {
            Item::Attributes(attributes) => self.resolve_attributes(state, attributes),
            Item::Model(model) => self.resolve_model(state, model),
        }
    }

    fn resolve_attributes(&self, state: &CollectionState, attributes: &Attributes) -> Option<Model> {
        self.id_key(attributes)
            .and_then(|key| state.lookup(&key))
            .or_else(|| {
                attributes
                    .get(CID_ATTRIBUTE)
                    .and_then(index_key)
                    .and_then(|cid| state.lookup(&cid))
            })
            .cloned()
    }

    fn resolve_model(&self, state: &CollectionState, model: &Model) -> Option<Model> {
        self.model_key(model)
            .and_then(|key| state.lookup(&key))
            .or_else(|| state.lookup(model.cid()))
            .cloned()
    }

    fn add_reference(&self, state: &mut CollectionState, model: &Model, weak: &WeakCollection) {
        state.by_id.insert(model.cid().to_string(), model.clone());
        self.rekey(state, model);
        model.join(weak);
    }

    fn remove_reference(&self, state: &mut CollectionState, model: &Model, weak: &WeakCollection) {
        if state.by_id.get(model.cid()).is_some_and(|m| m.ptr_eq(model)) {
            state.by_id.remove(model.cid());
        }
        if let Some(key) = state.server_keys.remove(model.cid()) {
            if state.by_id.get(&key).is_some_and(|m| m.ptr_eq(model)) {
                state.by_id.remove(&key);
            }
        }
        model.leave(weak);
        model.detach_from(weak);
    }

    /// Splice members out of the sequence, drop their index entries and clear their
    /// back-references. Candidates that are not members are skipped.
    fn remove_models(
        &self,
        state: &mut CollectionState,
        candidates: Vec<Model>,
        weak: &WeakCollection,
    ) -> Vec<Model> {
        let mut seen = HashSet::with_capacity(candidates.len());
        let removed: Vec<Model> = candidates
            .into_iter()
            .filter(|model| state.contains(model) && seen.insert(model.cid().to_string()))
            .collect();
        if removed.is_empty() {
            return removed;
        }
        state.models.retain(|member| !seen.contains(member.cid()));
        for model in &removed {
            self.remove_reference(state, model, weak);
        }
        removed
    }

    /// Point the member's server-id entry at its current id.
    ///
    /// An id already held by another member keeps pointing there.
    fn rekey(&self, state: &mut CollectionState, model: &Model) {
        let current = self.model_key(model);
        let recorded = state.server_keys.get(model.cid());
        if recorded == current.as_ref() {
            return;
        }
        if let Some(old) = state.server_keys.remove(model.cid()) {
            if state.by_id.get(&old).is_some_and(|m| m.ptr_eq(model)) {
                state.by_id.remove(&old);
            }
        }
        let Some(key) = current else {
            return;
        };
        let taken = state
            .lookup(&key)
            .is_some_and(|other| !other.ptr_eq(model));
        if taken {
            tracing::warn!(
                collection = %self.inner.name,
                cid = %model.cid(),
                id = %key,
                "Id already held by another member, not re-indexing"
            );
            return;
        }
        state.by_id.insert(key.clone(), model.clone());
        state.server_keys.insert(model.cid().to_string(), key);
    }

    /// Re-index `model` after its server id changed outside this collection's lock.
    pub(crate) fn reindex(&self, model: &Model) {
        let mut state = self.state_mut();
        if state.contains(model) {
            self.rekey(&mut state, model);
        }
    }

    /// Run a mutation under the write lock, then deliver its change events.
    ///
    /// Membership events (`models`, `length`) fire only when the sequence changed.
    fn mutate<R>(&self, f: impl FnOnce(&mut CollectionState, &mut Pending) -> R) -> R {
        let mut pending = Pending::default();
        let (result, membership) = {
            let mut state = self.state_mut();
            let result = f(&mut state, &mut pending);
            let membership = pending.membership_changed.then(|| {
                let cids: Vec<Value> = state
                    .models
                    .iter()
                    .map(|m| Value::String(m.cid().to_string()))
                    .collect();
                (cids, state.models.len())
            });
            (result, membership)
        };

        let weak = self.downgrade();
        for model in pending.rekeyed {
            model.reindex_memberships(Some(&weak));
        }
        for (observers, events) in pending.model_events {
            observers.emit_all(events);
        }
        if let Some((cids, length)) = membership {
            let source = self.inner.source();
            self.inner.observers.emit_all(vec![
                ChangeEvent::new(source.clone(), MODELS_KEY, Value::Array(cids)),
                ChangeEvent::new(source, LENGTH_KEY, Value::from(length)),
            ]);
        }
        result
    }

    /// Reconcile the collection against `items`.
    ///
    /// Returns the canonical member for every input item, in input order; items dropped
    /// because `add` is disabled are omitted.
    pub fn set<I>(&self, items: impl IntoIterator<Item = I>, options: SetOptions) -> Vec<Model>
    where
        I: Into<Item>,
    {
        let items = self.pre_parse(items.into_iter().map(Into::into).collect(), options.parse);
        let weak = self.downgrade();
        self.mutate(|state, pending| self.reconcile(state, items, &options, pending, &weak))
    }

    /// [`Collection::set`] for a single item.
    pub fn set_one(&self, item: impl Into<Item>, options: SetOptions) -> Option<Model> {
        self.set([item.into()], options).into_iter().next()
    }

    /// Append items that are not members yet; existing members are left untouched.
    pub fn add<I>(&self, items: impl IntoIterator<Item = I>) -> Vec<Model>
    where
        I: Into<Item>,
    {
        self.add_with(items, AddOptions::default())
    }

    /// [`Collection::add`] for a single item.
    pub fn add_one(&self, item: impl Into<Item>) -> Option<Model> {
        self.add([item.into()]).into_iter().next()
    }

    /// [`Collection::add`] with an insertion position and optional merging.
    pub fn add_with<I>(&self, items: impl IntoIterator<Item = I>, options: AddOptions) -> Vec<Model>
    where
        I: Into<Item>,
    {
        self.set(items, options.into())
    }

    /// Detach members. Lookups that match nothing are skipped.
    pub fn remove<L>(&self, lookups: impl IntoIterator<Item = L>) -> Vec<Model>
    where
        L: Into<Lookup>,
    {
        let lookups: Vec<Lookup> = lookups.into_iter().map(Into::into).collect();
        let weak = self.downgrade();
        let removed = self.mutate(|state, pending| {
            let candidates = lookups
                .iter()
                .filter_map(|lookup| self.resolve(state, lookup))
                .collect();
            let removed = self.remove_models(state, candidates, &weak);
            pending.membership_changed = !removed.is_empty();
            removed
        });
        tracing::trace!(collection = %self.inner.name, removed = removed.len(), "Removed");
        removed
    }

    /// [`Collection::remove`] for a single lookup.
    pub fn remove_one(&self, lookup: impl Into<Lookup>) -> Option<Model> {
        self.remove([lookup.into()]).into_iter().next()
    }

    /// Drop every member, then add `items` from scratch.
    pub fn reset<I>(&self, items: impl IntoIterator<Item = I>) -> Vec<Model>
    where
        I: Into<Item>,
    {
        let items: Vec<Item> = items.into_iter().map(Into::into).collect();
        let weak = self.downgrade();
        self.mutate(|state, pending| {
            let before = std::mem::take(&mut state.models);
            for model in &before {
                self.remove_reference(state, model, &weak);
            }
            state.by_id.clear();
            state.server_keys.clear();
            let options = SetOptions::from(AddOptions::default());
            let models = self.reconcile(state, items, &options, pending, &weak);
            pending.membership_changed = !same_members(&before, &state.models);
            models
        })
    }

    /// Drop every member.
    pub fn clear(&self) {
        self.reset(Vec::<Item>::new());
    }

    /// Member at `index`; negative indices count from the end.
    pub fn at(&self, index: isize) -> Option<Model> {
        let state = self.state();
        let index = if index < 0 {
            index.checked_add(state.models.len() as isize)?
        } else {
            index
        };
        usize::try_from(index)
            .ok()
            .and_then(|i| state.models.get(i).cloned())
    }

    /// Position of `model` in the sequence.
    pub fn index_of(&self, model: &Model) -> Option<usize> {
        self.state().index_of(model)
    }

    /// Check if `model` is a member.
    pub fn contains(&self, model: &Model) -> bool {
        self.state().contains(model)
    }

    pub fn len(&self) -> usize {
        self.state().models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().models.is_empty()
    }

    /// Snapshot of the members in order.
    pub fn models(&self) -> Vec<Model> {
        self.state().models.clone()
    }

    /// Attributes of every member, in order.
    pub fn to_json(&self) -> Vec<Attributes> {
        self.map(Model::to_json)
    }

    /// The resolved collection URL; `None` when unset or empty.
    pub fn url(&self) -> Option<String> {
        let source = self.state().url.clone();
        source.and_then(|source| source.resolve())
    }

    pub fn set_url(&self, url: Option<UrlSource>) {
        self.state_mut().url = url;
    }

    /// Convert a raw fetch response into items, through the configured parser if any.
    pub fn parse(&self, response: Value) -> Result<Vec<Value>> {
        match &self.inner.parser {
            Some(parser) => parser(response),
            None => payload_list(&self.inner.name, response),
        }
    }

    /// First member matching `predicate`.
    pub fn find(&self, predicate: impl Into<Predicate>) -> Option<Model> {
        let matcher = predicate.into().compile();
        self.models().into_iter().find(|m| matcher(m))
    }

    /// Every member matching `predicate`, in order.
    pub fn filter(&self, predicate: impl Into<Predicate>) -> Vec<Model> {
        let matcher = predicate.into().compile();
        self.models().into_iter().filter(|m| matcher(m)).collect()
    }

    /// True if every member matches (vacuously true when empty).
    pub fn every(&self, predicate: impl Into<Predicate>) -> bool {
        let matcher = predicate.into().compile();
        self.models().iter().all(|m| matcher(m))
    }

    /// True if any member matches.
    pub fn some(&self, predicate: impl Into<Predicate>) -> bool {
        let matcher = predicate.into().compile();
        self.models().iter().any(|m| matcher(m))
    }

    /// Members whose attributes contain `pattern`.
    pub fn where_attrs(&self, pattern: Attributes) -> Vec<Model> {
        self.filter(pattern)
    }

    /// First member whose attributes contain `pattern`.
    pub fn find_where(&self, pattern: Attributes) -> Option<Model> {
        self.find(pattern)
    }

    pub fn map<T>(&self, f: impl FnMut(&Model) -> T) -> Vec<T> {
        self.models().iter().map(f).collect()
    }

    pub fn for_each(&self, f: impl FnMut(&Model)) {
        self.models().iter().for_each(f);
    }

    fn status(&self, op: Operation) -> OperationStatus {
        self.state().statuses.get(&op).cloned().unwrap_or_default()
    }

    /// State of the most recent fetch.
    pub fn fetch_status(&self) -> OperationStatus {
        self.status(Operation::Fetch)
    }

    /// State of the most recent create.
    pub fn create_status(&self) -> OperationStatus {
        self.status(Operation::Create)
    }

    pub fn fetch_loading(&self) -> bool {
        self.fetch_status().is_loading()
    }

    pub fn fetch_error(&self) -> Option<Arc<crate::Error>> {
        self.fetch_status().error()
    }

    pub fn create_loading(&self) -> bool {
        self.create_status().is_loading()
    }

    pub fn create_error(&self) -> Option<Arc<crate::Error>> {
        self.create_status().error()
    }

    fn require_transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport().ok_or_else(|| {
            CollectionError::NoTransport {
                name: self.inner.name.clone(),
            }
            .into()
        })
    }

    fn require_url(&self) -> Result<String> {
        self.url().ok_or_else(|| {
            CollectionError::MissingUrl {
                name: self.inner.name.clone(),
            }
            .into()
        })
    }

    /// Replace the members with the server's list.
    ///
    /// Members are cleared before the request is sent, so the collection reads empty
    /// while the fetch is in flight. Never fails: the outcome is recorded in
    /// [`Collection::fetch_status`].
    pub async fn fetch(&self, options: FetchOptions) {
        let _gate = self.inner.requests.lock().await;
        tracing::debug!(collection = %self.inner.name, "fetch");

        status::track(&*self.inner, Operation::Fetch, async {
            self.clear();
            let transport = self.require_transport()?;
            let url = self.require_url()?;
            let data = transport.get(&url, options.request).await?;
            let items = if options.parse {
                self.parse(data)?
            } else {
                payload_list(&self.inner.name, data)?
            };
            self.reset(items);
            Ok(())
        })
        .await;
    }

    /// POST `attributes` to the collection URL and add the result as a new member.
    ///
    /// Server fields win over `attributes` on conflicting keys. Returns the new member,
    /// or `None` on failure, which is recorded in [`Collection::create_status`].
    pub async fn create(&self, attributes: Attributes, options: SaveOptions) -> Option<Model> {
        let _gate = self.inner.requests.lock().await;
        tracing::debug!(collection = %self.inner.name, "create");

        status::track(&*self.inner, Operation::Create, async {
            let transport = self.require_transport()?;
            let url = self.require_url()?;
            let data = transport
                .post(&url, Value::Object(attributes.clone()), options.request)
                .await?;
            let server = if options.parse {
                self.inner.schema.parse(data)?
            } else {
                payload_attributes(self.inner.schema.name(), data)?
            };
            Ok(self.add_one(crate::attributes::merged(&attributes, &server)))
        })
        .await
        .flatten()
    }

    /// Lazy cursor over the members.
    pub fn values(&self) -> Values {
        Values::new(self.downgrade())
    }

    /// Lazy cursor over the members' server ids.
    pub fn keys(&self) -> Keys {
        Keys::new(self.downgrade())
    }

    /// Lazy cursor over `(server id, member)` pairs.
    pub fn entries(&self) -> Entries {
        Entries::new(self.downgrade())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = Model;
    type IntoIter = Values;

    fn into_iter(self) -> Values {
        self.values()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("schema", &self.inner.schema.name())
            .field("url", &state.url)
            .field("length", &state.models.len())
            .finish()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let models = self.models();
        let mut seq = serializer.serialize_seq(Some(models.len()))?;
        for model in &models {
            seq.serialize_element(model)?;
        }
        seq.end()
    }
}
