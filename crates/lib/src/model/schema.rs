//! Entity-type customisation.
//!
//! A [`ModelSchema`] plays the role of a concrete entity type: it names the id
//! attribute, supplies defaults and a URL root, and adapts server payloads to
//! attribute maps. Every method has a default, so a schema only overrides what
//! differs from the base entity.

use serde_json::Value;

use crate::{
    Attributes, Result,
    constants::{DEFAULT_CID_PREFIX, DEFAULT_ID_ATTRIBUTE, DEFAULT_MODEL_NAME},
    model::ModelError,
    url_source::UrlSource,
};

/// Behaviour shared by all models of one entity type.
///
/// # Example
///
/// ```
/// use restbind::{Attributes, Model, ModelSchema, UrlSource};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// struct Person;
///
/// impl ModelSchema for Person {
///     fn name(&self) -> &str {
///         "Person"
///     }
///
///     fn id_attribute(&self) -> &str {
///         "user_id"
///     }
///
///     fn url_root(&self) -> Option<UrlSource> {
///         Some("/people".into())
///     }
/// }
///
/// let person = Model::with_schema(Arc::new(Person), Attributes::new());
/// assert_eq!(person.url().unwrap(), "/people");
///
/// let mut attrs = Attributes::new();
/// attrs.insert("user_id".to_string(), json!(1));
/// person.set(attrs);
/// assert_eq!(person.url().unwrap(), "/people/1");
/// ```
pub trait ModelSchema: Send + Sync + 'static {
    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        DEFAULT_MODEL_NAME
    }

    /// Attribute holding the server-assigned id.
    fn id_attribute(&self) -> &str {
        DEFAULT_ID_ATTRIBUTE
    }

    /// Prefix for generated client ids.
    fn cid_prefix(&self) -> &str {
        DEFAULT_CID_PREFIX
    }

    /// Root URL for models of this type, evaluated on every call.
    fn url_root(&self) -> Option<UrlSource> {
        None
    }

    /// Attributes every new model starts from; constructor attributes are laid over them.
    fn defaults(&self) -> Attributes {
        Attributes::new()
    }

    /// Convert a raw server payload into attributes.
    fn parse(&self, response: Value) -> Result<Attributes> {
        payload_attributes(self.name(), response)
    }
}

/// The base entity type: id attribute `id`, no url root, no defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSchema;

impl ModelSchema for DefaultSchema {}

/// Take a payload as attributes without reshaping it.
///
/// Objects are used as-is and `null` (an empty response) becomes an empty map.
pub fn payload_attributes(schema: &str, value: Value) -> Result<Attributes> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Attributes::new()),
        other => Err(ModelError::InvalidPayload {
            schema: schema.to_string(),
            expected: "a JSON object",
            actual: json_kind(&other).to_string(),
        }
        .into()),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_schema() {
        let schema = DefaultSchema;
        assert_eq!(schema.name(), "Model");
        assert_eq!(schema.id_attribute(), "id");
        assert_eq!(schema.cid_prefix(), "c");
        assert!(schema.url_root().is_none());
        assert!(schema.defaults().is_empty());
    }

    #[test]
    fn test_default_parse() {
        let schema = DefaultSchema;
        let attrs = schema.parse(json!({"id": 1})).unwrap();
        assert_eq!(attrs.get("id"), Some(&json!(1)));

        assert!(schema.parse(Value::Null).unwrap().is_empty());

        let err = schema.parse(json!([1, 2])).unwrap_err();
        assert!(err.is_usage_error());
        assert!(err.to_string().contains("an array"));
    }
}
