//! Constants used throughout the Restbind library.
//!
//! Central definitions for default attribute names, prefixes and the keys
//! reported to change observers.

/// Attribute holding the server-assigned identifier unless a schema overrides it.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Prefix of generated client ids (`c1`, `c2`, ...).
pub const DEFAULT_CID_PREFIX: &str = "c";

/// Attribute consulted as a last resort when resolving raw attribute maps by client id.
pub const CID_ATTRIBUTE: &str = "cid";

/// Name used in logs and change events for collections built without a name.
pub const DEFAULT_COLLECTION_NAME: &str = "Collection";

/// Name used in logs for entities without a dedicated schema.
pub const DEFAULT_MODEL_NAME: &str = "Model";

/// Change key emitted when the ordered member list of a collection changes.
pub const MODELS_KEY: &str = "models";

/// Change key emitted when the member count of a collection changes.
pub const LENGTH_KEY: &str = "length";

/// Environment variable read by `HttpTransportConfig::from_env` for the base URL.
pub const ENV_BASE_URL: &str = "RESTBIND_BASE_URL";

/// Environment variable read by `HttpTransportConfig::from_env` for the request timeout.
pub const ENV_TIMEOUT_MS: &str = "RESTBIND_TIMEOUT_MS";
