//! Attribute maps and the helpers built on top of them.
//!
//! Attributes are plain JSON objects. Server ids may be strings or numbers on the
//! wire, so every index lookup goes through [`index_key`] which folds both into the
//! same string key (`1` and `"1"` address the same model).

use serde_json::{Map, Value};

/// Mapping from field name to value; the data held by a model.
pub type Attributes = Map<String, Value>;

/// Derive the index key for an identifier value.
///
/// `null` never identifies anything. Strings are used verbatim, every other value
/// by its JSON rendering.
pub fn index_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Keys of `candidate` whose values differ (deep equality) from `current`.
///
/// Returns `None` when nothing differs. A key missing from `current` always counts
/// as a difference, even when the candidate value is `null`.
pub fn diff(current: &Attributes, candidate: &Attributes) -> Option<Attributes> {
    let changes: Attributes = candidate
        .iter()
        .filter(|(key, value)| current.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if changes.is_empty() {
        None
    } else {
        Some(changes)
    }
}

/// Check that every key of `pattern` is present in `attributes` with a deep-equal value.
pub fn matches(attributes: &Attributes, pattern: &Attributes) -> bool {
    pattern
        .iter()
        .all(|(key, expected)| attributes.get(key) == Some(expected))
}

/// Overlay `overlay` onto `base`, later keys winning.
pub fn merged(base: &Attributes, overlay: &Attributes) -> Attributes {
    let mut out = base.clone();
    for (key, value) in overlay {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Turn an arbitrary JSON value into an attribute map.
///
/// Objects are taken as-is; anything else yields an empty map.
pub(crate) fn from_value(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}
