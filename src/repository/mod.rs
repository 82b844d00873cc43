//! Repositories - one per entity kind, each owning CRUD for its collection.
//!
//! Every store failure is captured here and returned as a classified
//! [`RepositoryError`]; nothing below this layer escapes untagged.

mod collection;
mod comment;
mod error;
mod lesson;
mod outcome;
mod resource;

use serde_json::{Map, Value};

use crate::classify::{classify, ErrorCode};
use crate::document::{from_snapshot, Document, Timestamp};
use crate::store::{DocPath, DocumentStore, StoreError};

pub use collection::{CollectionFilter, CollectionRepository};
pub use comment::CommentRepository;
pub use error::RepositoryError;
pub use lesson::{LessonFilter, LessonRepository};
pub use outcome::{Notice, Outcome};
pub use resource::{ResourceFilter, ResourceRepository};

pub(crate) use error::require;

pub(crate) const CREATED_AT: &str = "createdAt";
pub(crate) const UPDATED_AT: &str = "updatedAt";

/// Last segment of a document's collection path (`comments` for
/// `lessons/l1/comments/c1`).
fn collection_name(path: &DocPath) -> &str {
    let parent = path.parent().as_str();
    parent.rsplit('/').next().unwrap_or(parent)
}

pub(crate) fn not_found_at(path: &DocPath) -> RepositoryError {
    RepositoryError::not_found(collection_name(path), path.id())
}

/// Maps a store `not-found` on `path` to [`RepositoryError::NotFound`].
pub(crate) fn missing_at(path: &DocPath) -> impl FnOnce(StoreError) -> RepositoryError + '_ {
    move |error| match classify(&error) {
        ErrorCode::NotFound => not_found_at(path),
        _ => error.into(),
    }
}

/// Rewrites any not-found from a maintainer call as a miss on `path`.
pub(crate) fn not_found_for(err: RepositoryError, path: &DocPath) -> RepositoryError {
    if err.code() == ErrorCode::NotFound {
        not_found_at(path)
    } else {
        err
    }
}

/// Reads and decodes one document, failing with `NotFound` when absent.
pub(crate) async fn fetch<T, S>(store: &S, path: &DocPath) -> Result<T, RepositoryError>
where
    T: Document,
    S: DocumentStore + ?Sized,
{
    let snapshot = store.get(path).await?.ok_or_else(|| not_found_at(path))?;
    from_snapshot(snapshot).map_err(|err| RepositoryError::Decode {
        path: path.to_string(),
        message: err.to_string(),
    })
}

/// Adds creation and modification timestamps to a new document.
pub(crate) fn stamped(mut fields: Map<String, Value>) -> Map<String, Value> {
    let now = Timestamp::now().to_value();
    fields.insert(CREATED_AT.to_string(), now.clone());
    fields.insert(UPDATED_AT.to_string(), now);
    fields
}
