//! DocumentStore - the schemaless collection store this crate is built over.
//!
//! The store offers exactly what hosted document databases guarantee without
//! extra configuration: single-document reads and writes, field transforms,
//! and conjunctive equality queries within one collection. No joins, no OR,
//! no server-side ordering.
//!
//! ## Example
//!
//! ```ignore
//! use edu_portal::{CollectionPath, DocumentStore, Filter, InMemoryDocumentStore, Patch};
//!
//! let store = InMemoryDocumentStore::new();
//! let lessons = CollectionPath::root("lessons");
//! let path = store.add(&lessons, fields).await?;
//! store.update(&path, Patch::new().increment("viewsCount", 1)).await?;
//! let mine = store.query(&lessons, &[Filter::eq("teacherId", "t1")]).await?;
//! ```

mod error;
mod in_memory;
mod patch;
mod path;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use error::StoreError;
pub use in_memory::{InMemoryDocumentStore, StoreOp};
pub use patch::{FieldOp, Patch};
pub use path::{CollectionPath, DocPath};

/// A document as returned by the store: its id plus its stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub data: Map<String, Value>,
}

/// An equality predicate on one top-level field.
///
/// A missing field never matches, not even `Filter::eq(field, Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::eq(field, Value::Null)
    }

    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// Async document store client.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document. `Ok(None)` when it does not exist.
    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError>;

    /// Create a document with a store-generated id.
    async fn add(
        &self,
        collection: &CollectionPath,
        data: Map<String, Value>,
    ) -> Result<DocPath, StoreError>;

    /// Create or overwrite a document at a known path.
    async fn set(&self, path: &DocPath, data: Map<String, Value>) -> Result<(), StoreError>;

    /// Apply a patch to an existing document. Fails with `not-found` if absent.
    async fn update(&self, path: &DocPath, patch: Patch) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete(&self, path: &DocPath) -> Result<(), StoreError>;

    /// All documents of `collection` matching every filter.
    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> Result<Vec<Snapshot>, StoreError>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        (**self).get(path).await
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        data: Map<String, Value>,
    ) -> Result<DocPath, StoreError> {
        (**self).add(collection, data).await
    }

    async fn set(&self, path: &DocPath, data: Map<String, Value>) -> Result<(), StoreError> {
        (**self).set(path, data).await
    }

    async fn update(&self, path: &DocPath, patch: Patch) -> Result<(), StoreError> {
        (**self).update(path, patch).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        (**self).delete(path).await
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> Result<Vec<Snapshot>, StoreError> {
        (**self).query(collection, filters).await
    }
}
