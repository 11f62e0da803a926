use std::{sync::Arc, time::Duration};

use restbind::{Collection, FetchOptions, InMemoryTransport, Method, RequestOptions, SaveOptions};
use serde_json::json;

use crate::helpers::{attrs, people};

#[tokio::test]
async fn test_fetch_populates_distinct_models() {
    let (collection, transport) = people();
    transport.reply(Method::Get, "/people", json!([{"id": 1}, {"id": 2}]));

    collection.fetch(FetchOptions::default()).await;

    assert_eq!(collection.len(), 2);
    assert!(!collection.fetch_loading());
    assert!(collection.fetch_error().is_none());
    let one = collection.get(1).unwrap();
    let two = collection.get(2).unwrap();
    assert!(!one.ptr_eq(&two));
    assert_eq!(one.url().unwrap(), "/people/1");
}

#[tokio::test]
async fn test_fetch_sends_request_options() {
    let (collection, transport) = people();
    transport.reply(Method::Get, "/people", json!([]));

    collection
        .fetch(FetchOptions::default().with_request(
            RequestOptions::new().query("page", "2").header("x-client", "tests"),
        ))
        .await;

    let request = transport.last_request().unwrap();
    assert_eq!(request.options.query, vec![("page".to_string(), "2".to_string())]);
    assert_eq!(
        request.options.headers,
        vec![("x-client".to_string(), "tests".to_string())]
    );
}

#[tokio::test]
async fn test_fetch_clears_members_while_in_flight() {
    let transport = Arc::new(InMemoryTransport::new().with_latency(Duration::from_millis(50)));
    transport.reply(Method::Get, "/people", json!([{"id": 3}]));
    let collection = Collection::builder()
        .url("/people")
        .transport(transport.clone())
        .models(vec![json!({"id": 1}), json!({"id": 2})])
        .build();

    let observer = collection.clone();
    let fetch = collection.fetch(FetchOptions::default());
    let observe = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        (observer.fetch_loading(), observer.len())
    };
    let ((), (loading, len)) = tokio::join!(fetch, observe);

    assert!(loading);
    assert_eq!(len, 0);
    assert_eq!(collection.len(), 1);
    assert!(!collection.fetch_loading());
}

#[tokio::test]
async fn test_fetch_network_error_is_stored() {
    let (collection, transport) = people();
    transport.disconnect(Method::Get, "/people");

    collection.fetch(FetchOptions::default()).await;

    let err = collection.fetch_error().unwrap();
    assert!(err.is_transport_error());
    assert_eq!(err.module(), "transport");
    assert!(!collection.fetch_loading());

    transport.reply(Method::Get, "/people", json!([{"id": 1}]));
    collection.fetch(FetchOptions::default()).await;
    assert!(collection.fetch_error().is_none());
    assert_eq!(collection.len(), 1);
}

#[tokio::test]
async fn test_create_then_destroy() {
    let (collection, transport) = people();
    transport.reply(Method::Post, "/people", json!({"id": 5}));
    transport.reply(Method::Delete, "/people/5", serde_json::Value::Null);

    let model = collection
        .create(attrs(json!({"name": "A"})), SaveOptions::default())
        .await
        .unwrap();
    assert_eq!(model.id(), Some(json!(5)));
    assert!(collection.get(5).is_some());

    model.destroy(RequestOptions::default()).await;

    assert!(model.delete_error().is_none());
    assert!(collection.get(5).is_none());
    assert!(collection.get(model.cid()).is_none());
    assert!(model.collection().is_none());
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_create_without_transport() {
    let collection = Collection::builder().url("/people").build();
    let created = collection
        .create(attrs(json!({"name": "A"})), SaveOptions::default())
        .await;

    assert!(created.is_none());
    assert!(collection.create_error().unwrap().is_usage_error());
}
