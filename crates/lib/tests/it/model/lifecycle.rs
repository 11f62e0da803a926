use std::sync::Arc;

use restbind::{
    Attributes, FetchOptions, InMemoryTransport, Method, Model, RequestOptions, SaveOptions,
};
use serde_json::json;

use crate::helpers::{Person, attrs, people};

fn person(transport: &Arc<InMemoryTransport>, attributes: Attributes) -> Model {
    Model::builder(Arc::new(Person))
        .attributes(attributes)
        .transport(transport.clone())
        .build()
        .unwrap()
}

#[test]
fn test_url_follows_id() {
    let model = Model::with_schema(Arc::new(Person), Attributes::new());
    assert_eq!(model.url().unwrap(), "/people");

    model.set(attrs(json!({"id": 1})));
    assert_eq!(model.url().unwrap(), "/people/1");
}

#[test]
fn test_compare_attributes_for_dirty_checking() {
    let model = Model::new(attrs(json!({"a": 1, "b": 2})));
    assert_eq!(
        model.compare_attributes(&attrs(json!({"a": 1, "b": 3}))),
        Some(attrs(json!({"b": 3})))
    );
    assert!(model.compare_attributes(&attrs(json!({"a": 1}))).is_none());
}

#[tokio::test]
async fn test_save_create_then_update() {
    let transport = Arc::new(InMemoryTransport::new());
    let model = person(&transport, attrs(json!({"name": "A"})));
    transport.reply(Method::Post, "/people", json!({"id": 1, "name": "A"}));
    transport.reply(Method::Patch, "/people/1", json!({"id": 1, "name": "B", "updated": true}));

    model.save(None, SaveOptions::default()).await;
    assert!(!model.is_new());
    assert_eq!(model.url().unwrap(), "/people/1");

    model
        .save(Some(attrs(json!({"name": "B"}))), SaveOptions::default())
        .await;
    assert_eq!(model.get("updated"), Some(json!(true)));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[1].method, Method::Patch);
    assert_eq!(requests[1].body, Some(json!({"name": "B"})));
}

#[tokio::test]
async fn test_status_resets_between_runs() {
    let transport = Arc::new(InMemoryTransport::new());
    let model = person(&transport, attrs(json!({"id": 1})));
    transport.fail(Method::Get, "/people/1", 500);

    model.fetch(FetchOptions::default()).await;
    assert_eq!(model.fetch_error().unwrap().status(), Some(500));
    assert!(model.save_status().is_idle());

    transport.reply(Method::Get, "/people/1", json!({"id": 1}));
    model.fetch(FetchOptions::default()).await;
    assert!(model.fetch_status().is_idle());
}

#[tokio::test]
async fn test_destroy_member_of_collection() {
    let (collection, transport) = people();
    let model = collection.add_one(json!({"id": 1})).unwrap();
    let other = collection.add_one(json!({"id": 2})).unwrap();
    transport.reply(Method::Delete, "/people/1", serde_json::Value::Null);

    model.destroy(RequestOptions::default()).await;

    assert!(!collection.contains(&model));
    assert!(collection.get(1).is_none());
    assert!(model.collection().is_none());
    assert!(collection.at(0).unwrap().ptr_eq(&other));
}

#[tokio::test]
async fn test_destroy_without_collection() {
    let transport = Arc::new(InMemoryTransport::new());
    let model = person(&transport, attrs(json!({"id": 3})));
    transport.reply(Method::Delete, "/people/3", serde_json::Value::Null);

    model.destroy(RequestOptions::default()).await;

    assert!(model.delete_status().is_idle());
    assert_eq!(transport.last_request().unwrap().url, "/people/3");
}

#[tokio::test]
async fn test_dropped_save_clears_loading() {
    let transport = Arc::new(
        InMemoryTransport::new().with_latency(std::time::Duration::from_secs(5)),
    );
    let model = person(&transport, attrs(json!({"id": 1})));
    transport.reply(Method::Patch, "/people/1", json!({}));

    let save = model.save(None, SaveOptions::default());
    let timed_out =
        tokio::time::timeout(std::time::Duration::from_millis(20), save).await;

    assert!(timed_out.is_err());
    assert!(!model.save_loading());
}
