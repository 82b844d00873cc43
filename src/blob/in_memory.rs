use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use super::{BlobStore, ProgressFn, UploadProgress};
use crate::store::StoreError;

const URL_PREFIX: &str = "memory://blobs/";
const CHUNK: usize = 64 * 1024;

#[derive(Default)]
struct Inner {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    upload_faults: Mutex<Vec<StoreError>>,
    delete_faults: Mutex<Vec<StoreError>>,
}

/// Blob store kept in a map keyed by path. Clones share storage.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    inner: Arc<Inner>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_upload(&self, error: StoreError) {
        if let Ok(mut faults) = self.inner.upload_faults.lock() {
            faults.push(error);
        }
    }

    pub fn fail_next_delete(&self, error: StoreError) {
        if let Ok(mut faults) = self.inner.delete_faults.lock() {
            faults.push(error);
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        let Some(path) = url.strip_prefix(URL_PREFIX) else {
            return false;
        };
        self.inner
            .blobs
            .read()
            .map(|blobs| blobs.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_fault(faults: &Mutex<Vec<StoreError>>) -> Option<StoreError> {
        faults.lock().ok().and_then(|mut faults| {
            if faults.is_empty() {
                None
            } else {
                Some(faults.remove(0))
            }
        })
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        on_progress: Option<&ProgressFn>,
    ) -> Result<String, StoreError> {
        if let Some(error) = Self::take_fault(&self.inner.upload_faults) {
            return Err(error);
        }

        let total = bytes.len() as u64;
        if let Some(report) = on_progress {
            report(UploadProgress { transferred: 0, total });
            let mut transferred = 0u64;
            for chunk in bytes.chunks(CHUNK) {
                transferred += chunk.len() as u64;
                report(UploadProgress { transferred, total });
            }
        }

        let mut blobs = self
            .inner
            .blobs
            .write()
            .map_err(|_| StoreError::lock_poisoned("blob upload"))?;
        blobs.insert(path.to_string(), bytes);

        tracing::debug!(path, bytes = total, "blob stored");
        Ok(format!("{}{}", URL_PREFIX, path))
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        if let Some(error) = Self::take_fault(&self.inner.delete_faults) {
            return Err(error);
        }

        let path = url
            .strip_prefix(URL_PREFIX)
            .ok_or_else(|| StoreError::new("invalid-argument", format!("not a blob url: {}", url)))?;
        let mut blobs = self
            .inner
            .blobs
            .write()
            .map_err(|_| StoreError::lock_poisoned("blob delete"))?;
        blobs.remove(path);
        Ok(())
    }
}
