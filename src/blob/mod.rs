//! BlobStore - binary uploads returning a stable retrieval URL.

mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::Timestamp;
use crate::store::StoreError;

pub use in_memory::InMemoryBlobStore;

/// Upload progress in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub transferred: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Whole percent transferred. An empty upload is complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.transferred.min(self.total) * 100) / self.total) as u8
    }
}

pub type ProgressFn = dyn Fn(UploadProgress) + Send + Sync;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and return the retrieval URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        on_progress: Option<&ProgressFn>,
    ) -> Result<String, StoreError>;

    /// Remove the blob behind a URL previously returned by `upload`.
    async fn delete(&self, url: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        on_progress: Option<&ProgressFn>,
    ) -> Result<String, StoreError> {
        (**self).upload(path, bytes, on_progress).await
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        (**self).delete(url).await
    }
}

/// Storage path for an upload: `{domain}/{ownerId}/{millis}_{fileName}`.
///
/// Separators in the file name are replaced so the name stays one segment.
pub fn blob_path(domain: &str, owner_id: &str, at: Timestamp, file_name: &str) -> String {
    let file_name: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}/{}/{}_{}", domain, owner_id, at.as_millis(), file_name)
}
