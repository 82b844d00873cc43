//! Documents - typed entities mapped onto schemaless store documents.
//!
//! ## Example
//!
//! ```ignore
//! use edu_portal::{Document, Timestamp};
//!
//! #[derive(Clone, Serialize, Deserialize, Document)]
//! #[document(collection = "resources")]
//! #[serde(rename_all = "camelCase")]
//! struct Resource {
//!     #[serde(default)]
//!     pub id: String,
//!     #[document(created_at)]
//!     #[serde(default, with = "edu_portal::timestamp::lenient")]
//!     pub created_at: Option<Timestamp>,
//! }
//! ```

pub mod count;
pub mod timestamp;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::store::Snapshot;

pub use timestamp::Timestamp;

/// Trait for types persisted as store documents.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name (the last path segment for nested collections).
    const COLLECTION: &'static str;

    /// The document id. Identity for deduplication.
    fn id(&self) -> &str;

    fn created_at(&self) -> Option<Timestamp> {
        None
    }

    fn updated_at(&self) -> Option<Timestamp> {
        None
    }
}

/// Decode a snapshot into a typed document. The snapshot id is injected as
/// the `id` field so types never need to store it themselves.
pub fn from_snapshot<T: Document>(snapshot: Snapshot) -> Result<T, serde_json::Error> {
    let Snapshot { id, mut data } = snapshot;
    data.insert("id".to_string(), Value::String(id));
    serde_json::from_value(Value::Object(data))
}

/// Encode a value as a store field map. Any `id` field is dropped; identity
/// lives in the document path.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(serde::ser::Error::custom(format!(
            "expected a document object, got {}",
            other
        ))),
    }
}
