//! Lazy cursors over a collection.
//!
//! Cursors hold only a [`WeakCollection`] and read one position at a time, so they
//! see changes made while iterating. Once a cursor stops (end reached or collection
//! dropped) it never yields again.

use std::iter::FusedIterator;

use serde_json::Value;

use super::{Collection, WeakCollection};
use crate::Model;

struct Cursor {
    collection: Option<WeakCollection>,
    index: usize,
}

impl Cursor {
    fn new(collection: WeakCollection) -> Self {
        Self {
            collection: Some(collection),
            index: 0,
        }
    }

    fn advance(&mut self) -> Option<(Collection, Model)> {
        let collection = self.collection.as_ref().and_then(WeakCollection::upgrade);
        let next = collection.and_then(|c| {
            let model = c.state().models.get(self.index).cloned()?;
            Some((c, model))
        });
        match next {
            Some(pair) => {
                self.index += 1;
                Some(pair)
            }
            None => {
                self.collection = None;
                None
            }
        }
    }
}

/// Cursor over members, from [`Collection::values`].
pub struct Values {
    cursor: Cursor,
}

impl Values {
    pub(super) fn new(collection: WeakCollection) -> Self {
        Self {
            cursor: Cursor::new(collection),
        }
    }
}

impl Iterator for Values {
    type Item = Model;

    fn next(&mut self) -> Option<Model> {
        self.cursor.advance().map(|(_, model)| model)
    }
}

impl FusedIterator for Values {}

/// Cursor over server ids, from [`Collection::keys`]. Unsaved members yield `None`.
pub struct Keys {
    cursor: Cursor,
}

impl Keys {
    pub(super) fn new(collection: WeakCollection) -> Self {
        Self {
            cursor: Cursor::new(collection),
        }
    }
}

impl Iterator for Keys {
    type Item = Option<Value>;

    fn next(&mut self) -> Option<Option<Value>> {
        self.cursor
            .advance()
            .map(|(collection, model)| collection.model_id(&model.attributes()))
    }
}

impl FusedIterator for Keys {}

/// Cursor over `(server id, member)` pairs, from [`Collection::entries`].
pub struct Entries {
    cursor: Cursor,
}

impl Entries {
    pub(super) fn new(collection: WeakCollection) -> Self {
        Self {
            cursor: Cursor::new(collection),
        }
    }
}

impl Iterator for Entries {
    type Item = (Option<Value>, Model);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance().map(|(collection, model)| {
            let id = collection.model_id(&model.attributes());
            (id, model)
        })
    }
}

impl FusedIterator for Entries {}
