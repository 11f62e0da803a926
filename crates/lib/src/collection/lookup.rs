//! Input items and lookup keys.

use serde_json::Value;

use crate::{
    Attributes, Model,
    attributes::{from_value, index_key},
};

/// One element of the input to [`Collection::set`](super::Collection::set).
#[derive(Debug, Clone)]
pub enum Item {
    /// Raw attributes, wrapped into a new model when added.
    Attributes(Attributes),
    /// An existing model, adopted as-is when added.
    Model(Model),
}

impl Item {
    /// Attributes to merge into an existing member.
    pub(crate) fn attributes(&self) -> Attributes {
        match self {
            Item::Attributes(attributes) => attributes.clone(),
            Item::Model(model) => model.attributes(),
        }
    }

    /// Whether this item is literally `model`.
    pub(crate) fn is(&self, model: &Model) -> bool {
        matches!(self, Item::Model(m) if m.ptr_eq(model))
    }
}

impl From<Attributes> for Item {
    fn from(attributes: Attributes) -> Self {
        Item::Attributes(attributes)
    }
}

/// Objects become attributes; other values become an empty attribute set.
impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Attributes(from_value(value))
    }
}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Item::Model(model)
    }
}

impl From<&Model> for Item {
    fn from(model: &Model) -> Self {
        Item::Model(model.clone())
    }
}

/// How to find a member of a collection.
///
/// `Key` hits the index directly with an id or cid. `Attributes` and `Model` try the
/// server id derived from the attributes first, then the cid.
#[derive(Debug, Clone)]
pub enum Lookup {
    Key(String),
    Attributes(Attributes),
    Model(Model),
}

impl From<&str> for Lookup {
    fn from(key: &str) -> Self {
        Lookup::Key(key.to_string())
    }
}

impl From<String> for Lookup {
    fn from(key: String) -> Self {
        Lookup::Key(key)
    }
}

macro_rules! lookup_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Lookup {
                fn from(id: $ty) -> Self {
                    Lookup::Key(id.to_string())
                }
            }
        )*
    };
}

lookup_from_int!(i32, i64, u32, u64, usize);

/// Objects look up by attributes; scalars by their index key.
impl From<Value> for Lookup {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(attributes) => Lookup::Attributes(attributes),
            other => match index_key(&other) {
                Some(key) => Lookup::Key(key),
                None => Lookup::Attributes(Attributes::new()),
            },
        }
    }
}

impl From<Attributes> for Lookup {
    fn from(attributes: Attributes) -> Self {
        Lookup::Attributes(attributes)
    }
}

impl From<Model> for Lookup {
    fn from(model: Model) -> Self {
        Lookup::Model(model)
    }
}

impl From<&Model> for Lookup {
    fn from(model: &Model) -> Self {
        Lookup::Model(model.clone())
    }
}

impl From<Item> for Lookup {
    fn from(item: Item) -> Self {
        match item {
            Item::Attributes(attributes) => Lookup::Attributes(attributes),
            Item::Model(model) => Lookup::Model(model),
        }
    }
}
