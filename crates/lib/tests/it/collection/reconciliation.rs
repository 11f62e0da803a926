use std::sync::Arc;

use restbind::{AddOptions, Collection, Item, Model, SetOptions};
use serde_json::json;

use crate::helpers::{Person, attrs, ids};

#[test]
fn test_every_member_is_reachable_by_cid_and_id() {
    let collection = Collection::builder().schema(Arc::new(Person)).build();
    let members = collection.add(vec![json!({"id": 1}), json!({}), json!({"id": "x"})]);

    for model in &members {
        assert!(collection.get(model.cid()).unwrap().ptr_eq(model));
        if let Some(id) = collection.model_id(&model.attributes()) {
            assert!(collection.get(id).unwrap().ptr_eq(model));
        }
    }
}

#[test]
fn test_repeated_add_does_not_duplicate() {
    let collection = Collection::new();
    let model = Model::new(attrs(json!({"id": 1})));

    collection.add_one(&model);
    collection.add_one(&model);
    collection.add(vec![json!({"id": 1})]);

    assert_eq!(collection.len(), 1);
    assert_eq!(
        collection.models().iter().filter(|m| m.ptr_eq(&model)).count(),
        1
    );
}

#[test]
fn test_merge_updates_the_existing_instance() {
    let collection = Collection::new();
    let existing = collection.add_one(json!({"id": 1, "name": "A"})).unwrap();

    collection.set(vec![json!({"id": 1, "name": "B"})], SetOptions::default());

    assert_eq!(collection.len(), 1);
    assert_eq!(existing.get("name"), Some(json!("B")));
    assert!(collection.get(1).unwrap().ptr_eq(&existing));
}

#[test]
fn test_full_replace_resyncs_sequence_and_index() {
    let collection = Collection::new();
    let old = collection.add(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    let kept = old[2].clone();
    let stranger = Model::new(attrs(json!({"id": 10})));

    let resolved = collection.set(
        vec![
            Item::from(json!({"id": 3})),
            Item::from(&stranger),
            Item::from(json!({"id": 11})),
        ],
        SetOptions::default(),
    );

    let models = collection.models();
    assert_eq!(models.len(), resolved.len());
    for (member, expected) in models.iter().zip(&resolved) {
        assert!(member.ptr_eq(expected));
    }
    assert!(resolved[0].ptr_eq(&kept));
    assert!(resolved[1].ptr_eq(&stranger));
    assert!(stranger.belongs_to(&collection));

    for gone in &old[..2] {
        assert!(collection.get(gone.cid()).is_none());
        assert!(gone.collection().is_none());
    }
    assert!(collection.get(1).is_none());
    assert!(collection.get(2).is_none());
}

#[test]
fn test_insertion_positions() {
    let collection = Collection::new();
    collection.add(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);

    collection.add_with(
        vec![json!({"id": 4})],
        AddOptions {
            at: Some(1),
            merge: false,
        },
    );
    assert_eq!(ids(&collection), vec![Some(json!(1)), Some(json!(4)), Some(json!(2)), Some(json!(3))]);

    let collection = Collection::new();
    collection.add(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    collection.add_with(
        vec![json!({"id": 4})],
        AddOptions {
            at: Some(-1),
            merge: false,
        },
    );
    assert_eq!(collection.index_of(&collection.get(4).unwrap()), Some(3));
}

#[test]
fn test_set_at_with_remove_disabled() {
    let collection = Collection::new();
    collection.add(vec![json!({"id": 1}), json!({"id": 2})]);

    collection.set(
        vec![json!({"id": 9}), json!({"id": 8})],
        SetOptions {
            remove: false,
            ..SetOptions::default().at(0)
        },
    );
    assert_eq!(
        ids(&collection),
        vec![Some(json!(9)), Some(json!(8)), Some(json!(1)), Some(json!(2))]
    );
}

#[test]
fn test_remove_then_readd_gets_new_back_reference() {
    let collection = Collection::new();
    let model = collection.add_one(json!({"id": 1})).unwrap();

    collection.remove_one(&model);
    assert!(model.collection().is_none());

    collection.add_one(&model);
    assert!(model.belongs_to(&collection));
    assert!(collection.get(1).unwrap().ptr_eq(&model));
}

#[test]
fn test_to_json_matches_attributes() {
    let collection = Collection::new();
    let model = collection.add_one(json!({"id": 1, "nested": {"a": [1, 2]}})).unwrap();

    assert_eq!(model.to_json(), model.attributes());
    assert_eq!(
        serde_json::to_value(&collection).unwrap(),
        json!([{"id": 1, "nested": {"a": [1, 2]}}])
    );
}
