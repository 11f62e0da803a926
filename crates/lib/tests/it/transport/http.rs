use std::sync::Arc;

use restbind::{
    Collection, FetchOptions, HttpTransport, RequestOptions, SaveOptions, Transport,
};
use serde_json::json;

use crate::helpers::{Person, attrs, spawn_people_server};

async fn setup(seed: Vec<serde_json::Value>) -> (Collection, crate::helpers::Rows) {
    let (base_url, rows) = spawn_people_server(seed).await;
    let transport = HttpTransport::builder().base_url(base_url).build().unwrap();
    let collection = Collection::builder()
        .name("People")
        .schema(Arc::new(Person))
        .url("/people")
        .transport(Arc::new(transport))
        .build();
    (collection, rows)
}

#[tokio::test]
async fn test_fetch_over_http() {
    let (collection, _rows) = setup(vec![json!({"id": 1, "name": "A"}), json!({"id": 2, "name": "B"})]).await;

    collection.fetch(FetchOptions::default()).await;

    assert!(collection.fetch_error().is_none(), "{:?}", collection.fetch_error());
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.get(2).unwrap().get("name"), Some(json!("B")));
}

#[tokio::test]
async fn test_create_save_destroy_over_http() {
    let (collection, rows) = setup(Vec::new()).await;

    let model = collection
        .create(attrs(json!({"name": "A"})), SaveOptions::default())
        .await
        .unwrap();
    assert_eq!(model.id(), Some(json!(1)));
    assert_eq!(rows.lock().unwrap().len(), 1);

    model
        .save(Some(attrs(json!({"name": "B"}))), SaveOptions::default())
        .await;
    assert!(model.save_error().is_none());
    assert_eq!(rows.lock().unwrap()[&1]["name"], json!("B"));

    model.destroy(RequestOptions::default()).await;
    assert!(model.delete_error().is_none(), "{:?}", model.delete_error());
    assert!(rows.lock().unwrap().is_empty());
    assert!(collection.is_empty());
}

#[tokio::test]
async fn test_not_found_is_reported() {
    let (collection, _rows) = setup(Vec::new()).await;
    let model = collection.add_one(json!({"id": 42})).unwrap();

    model.fetch(FetchOptions::default()).await;

    let err = model.fetch_error().unwrap();
    assert!(err.is_not_found());
    assert!(err.is_transport_error());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop a listener to get a port with nothing behind it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();
    let err = transport
        .get("/people", RequestOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_transport_error());
    assert_eq!(err.status(), None);
    assert!(!err.is_usage_error());
}
