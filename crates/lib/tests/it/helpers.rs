use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use restbind::{Attributes, Collection, InMemoryTransport, ModelSchema, UrlSource};
use serde_json::Value;

// ==========================
// ATTRIBUTE HELPERS
// ==========================

/// Turn a `json!` object literal into attributes.
pub fn attrs(value: Value) -> Attributes {
    value
        .as_object()
        .cloned()
        .expect("attribute literal must be a JSON object")
}

/// Server ids of the members, in order.
pub fn ids(collection: &Collection) -> Vec<Option<Value>> {
    collection.keys().collect()
}

// ==========================
// SCHEMAS
// ==========================

/// People stored under `/people`, identified by `id`.
pub struct Person;

impl ModelSchema for Person {
    fn name(&self) -> &str {
        "Person"
    }

    fn url_root(&self) -> Option<UrlSource> {
        Some("/people".into())
    }
}

// ==========================
// COLLECTION FACTORIES
// ==========================

/// A `/people` collection wired to a fresh scripted transport.
pub fn people() -> (Collection, Arc<InMemoryTransport>) {
    let transport = Arc::new(InMemoryTransport::new());
    let collection = Collection::builder()
        .name("People")
        .schema(Arc::new(Person))
        .url("/people")
        .transport(transport.clone())
        .build();
    (collection, transport)
}

// ==========================
// STUB REST SERVER
// ==========================

pub type Rows = Arc<Mutex<BTreeMap<u64, Value>>>;

/// Serve a minimal `/people` REST resource on an ephemeral local port.
///
/// Returns the base URL and the server-side rows for assertions.
pub async fn spawn_people_server(seed: Vec<Value>) -> (String, Rows) {
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::get,
    };

    async fn list(State(rows): State<Rows>) -> Json<Value> {
        Json(Value::Array(rows.lock().unwrap().values().cloned().collect()))
    }

    async fn create(State(rows): State<Rows>, Json(mut body): Json<Value>) -> (StatusCode, Json<Value>) {
        let mut rows = rows.lock().unwrap();
        let id = rows.keys().next_back().map_or(1, |last| last + 1);
        body["id"] = Value::from(id);
        rows.insert(id, body.clone());
        (StatusCode::CREATED, Json(body))
    }

    async fn show(State(rows): State<Rows>, Path(id): Path<u64>) -> Result<Json<Value>, StatusCode> {
        rows.lock()
            .unwrap()
            .get(&id)
            .cloned()
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn update(
        State(rows): State<Rows>,
        Path(id): Path<u64>,
        Json(patch): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        let mut rows = rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        if let (Some(row), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in patch {
                row.insert(key.clone(), value.clone());
            }
        }
        Ok(Json(row.clone()))
    }

    async fn destroy(State(rows): State<Rows>, Path(id): Path<u64>) -> StatusCode {
        match rows.lock().unwrap().remove(&id) {
            Some(_) => StatusCode::NO_CONTENT,
            None => StatusCode::NOT_FOUND,
        }
    }

    let rows: Rows = Arc::new(Mutex::new(
        seed.into_iter()
            .filter_map(|row| Some((row.get("id")?.as_u64()?, row)))
            .collect(),
    ));

    let router = Router::new()
        .route("/people", get(list).post(create))
        .route("/people/{id}", get(show).patch(update).delete(destroy))
        .with_state(rows.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Stub server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    (format!("http://{addr}"), rows)
}
