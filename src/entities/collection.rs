use serde::{Deserialize, Serialize};

use super::FileRef;
use crate::document::{timestamp, Timestamp};
use crate::Document;

/// A teacher-curated set of files for one subject.
///
/// `group_id == None` (stored as an explicit `null`) makes the collection
/// visible to every group studying the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "resourceCollections")]
#[serde(rename_all = "camelCase")]
pub struct ResourceCollection {
    #[serde(default)]
    pub id: String,
    pub teacher_id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub subject_id: String,
    #[serde(default)]
    pub title: String,
    /// A set: no two deep-equal entries.
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[document(created_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub created_at: Option<Timestamp>,
    #[document(updated_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub teacher_id: String,
    /// Serialized as `null` when absent so global scope stays queryable.
    pub group_id: Option<String>,
    pub subject_id: String,
    pub title: String,
    #[serde(default)]
    pub files: Vec<FileRef>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub title: Option<String>,
    /// `Some(None)` widens the collection to every group.
    pub group_id: Option<Option<String>>,
}
