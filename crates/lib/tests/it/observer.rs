//! Change notification seen from a subscriber.

use std::sync::Arc;

use restbind::{ChangeSource, Collection, FetchOptions, InMemoryTransport, Method, Observers};
use serde_json::json;

#[tokio::test]
async fn test_subscriber_sees_fetch_lifecycle() {
    let transport = Arc::new(InMemoryTransport::new());
    transport.reply(Method::Get, "/items", json!([{"id": 1}]));
    let observers = Observers::new();
    let mut events = observers.subscribe();
    let collection = Collection::builder()
        .name("Items")
        .url("/items")
        .transport(transport)
        .observers(observers)
        .build();

    collection.fetch(FetchOptions::default()).await;

    let mut keys = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(
            event.source,
            ChangeSource::Collection {
                name: "Items".to_string()
            }
        );
        keys.push(event.key);
    }
    assert_eq!(
        keys,
        vec!["fetch_loading", "fetch_error", "models", "length", "fetch_loading"]
    );
}

#[tokio::test]
async fn test_member_changes_reach_collection_subscribers() {
    let collection = Collection::new();
    let mut events = collection.observers().subscribe();
    let model = collection.add_one(json!({"id": 1})).unwrap();

    model.set(json!({"name": "A"}).as_object().cloned().unwrap());

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    let last = last.unwrap();
    assert_eq!(last.key, "name");
    assert_eq!(
        last.source,
        ChangeSource::Model {
            cid: model.cid().to_string()
        }
    );
}

#[test]
fn test_no_observers_is_fine() {
    let collection = Collection::new();
    collection.add(vec![json!({"id": 1})]);
    collection.clear();
    assert!(collection.observers().is_empty());
}
