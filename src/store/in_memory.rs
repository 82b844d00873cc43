//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{CollectionPath, DocPath, DocumentStore, Filter, Patch, Snapshot, StoreError};
use crate::document::Timestamp;

/// Store operations, used to target injected faults and to count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Add,
    Set,
    Update,
    Delete,
    Query,
}

struct Fault {
    op: StoreOp,
    skip: usize,
    error: StoreError,
}

type Documents = BTreeMap<String, Map<String, Value>>;

#[derive(Default)]
struct Inner {
    collections: RwLock<HashMap<String, Documents>>,
    faults: Mutex<Vec<Fault>>,
    calls: Mutex<HashMap<StoreOp, usize>>,
    interleaved: bool,
}

/// In-memory document store.
///
/// Collections are keyed by their full path (`lessons/l1/comments`), documents
/// by id in id order. Clone-friendly via Arc: clones share storage.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that yields to the executor before every operation, so that
    /// concurrently joined callers interleave at each store round trip the way
    /// they would against a remote store.
    pub fn interleaved() -> Self {
        Self {
            inner: Arc::new(Inner {
                interleaved: true,
                ..Inner::default()
            }),
        }
    }

    /// Make the next `op` call fail with `error`.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.fail_after(op, 0, error);
    }

    /// Let `skip` calls of `op` through, then fail the following one with `error`.
    pub fn fail_after(&self, op: StoreOp, skip: usize, error: StoreError) {
        if let Ok(mut faults) = self.inner.faults.lock() {
            faults.push(Fault { op, skip, error });
        }
    }

    /// Number of `op` calls received so far, failed ones included.
    pub fn calls(&self, op: StoreOp) -> usize {
        self.inner
            .calls
            .lock()
            .map(|calls| calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Synchronous read of a stored document, bypassing faults and call counts.
    pub fn peek(&self, path: &DocPath) -> Option<Map<String, Value>> {
        let collections = self.inner.collections.read().ok()?;
        collections
            .get(path.parent().as_str())
            .and_then(|docs| docs.get(path.id()))
            .cloned()
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: &CollectionPath) -> usize {
        self.inner
            .collections
            .read()
            .map(|collections| collections.get(collection.as_str()).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &CollectionPath) -> bool {
        self.len(collection) == 0
    }

    async fn begin(&self, op: StoreOp, location: &str) -> Result<(), StoreError> {
        if self.inner.interleaved {
            tokio::task::yield_now().await;
        }

        tracing::debug!(?op, location, "store call");

        if let Ok(mut calls) = self.inner.calls.lock() {
            *calls.entry(op).or_insert(0) += 1;
        }

        let mut faults = self
            .inner
            .faults
            .lock()
            .map_err(|_| StoreError::lock_poisoned("fault check"))?;
        if let Some(pos) = faults.iter().position(|fault| fault.op == op) {
            if faults[pos].skip == 0 {
                let fault = faults.remove(pos);
                tracing::debug!(?op, location, error = %fault.error, "injected store fault");
                return Err(fault.error);
            }
            faults[pos].skip -= 1;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        self.begin(StoreOp::Get, &path.to_string()).await?;
        let collections = self
            .inner
            .collections
            .read()
            .map_err(|_| StoreError::lock_poisoned("get"))?;

        Ok(collections
            .get(path.parent().as_str())
            .and_then(|docs| docs.get(path.id()))
            .map(|data| Snapshot {
                id: path.id().to_string(),
                data: data.clone(),
            }))
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        data: Map<String, Value>,
    ) -> Result<DocPath, StoreError> {
        self.begin(StoreOp::Add, collection.as_str()).await?;
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self
            .inner
            .collections
            .write()
            .map_err(|_| StoreError::lock_poisoned("add"))?;

        collections
            .entry(collection.as_str().to_string())
            .or_default()
            .insert(id.clone(), data);

        Ok(collection.doc(&id))
    }

    async fn set(&self, path: &DocPath, data: Map<String, Value>) -> Result<(), StoreError> {
        self.begin(StoreOp::Set, &path.to_string()).await?;
        let mut collections = self
            .inner
            .collections
            .write()
            .map_err(|_| StoreError::lock_poisoned("set"))?;

        collections
            .entry(path.parent().as_str().to_string())
            .or_default()
            .insert(path.id().to_string(), data);
        Ok(())
    }

    async fn update(&self, path: &DocPath, patch: Patch) -> Result<(), StoreError> {
        self.begin(StoreOp::Update, &path.to_string()).await?;
        let mut collections = self
            .inner
            .collections
            .write()
            .map_err(|_| StoreError::lock_poisoned("update"))?;

        let document = collections
            .get_mut(path.parent().as_str())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| StoreError::not_found(path))?;

        patch.apply_to(document, Timestamp::now());
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        self.begin(StoreOp::Delete, &path.to_string()).await?;
        let mut collections = self
            .inner
            .collections
            .write()
            .map_err(|_| StoreError::lock_poisoned("delete"))?;

        if let Some(docs) = collections.get_mut(path.parent().as_str()) {
            docs.remove(path.id());
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        filters: &[Filter],
    ) -> Result<Vec<Snapshot>, StoreError> {
        self.begin(StoreOp::Query, collection.as_str()).await?;
        let collections = self
            .inner
            .collections
            .read()
            .map_err(|_| StoreError::lock_poisoned("query"))?;

        let Some(docs) = collections.get(collection.as_str()) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, data)| filters.iter().all(|filter| filter.matches(data)))
            .map(|(id, data)| Snapshot {
                id: id.clone(),
                data: data.clone(),
            })
            .collect())
    }
}
