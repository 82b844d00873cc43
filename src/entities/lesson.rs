use serde::{Deserialize, Serialize};

use super::FileRef;
use crate::document::{count, timestamp, Timestamp};
use crate::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "lessons")]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: String,
    pub teacher_id: String,
    pub subject: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attached files, in attach order.
    #[serde(default)]
    pub resources: Vec<FileRef>,
    /// Number of live comments under `lessons/{id}/comments`.
    #[serde(default, deserialize_with = "count::lenient")]
    pub comments_count: u64,
    #[serde(default, deserialize_with = "count::lenient")]
    pub views_count: u64,
    #[document(created_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub created_at: Option<Timestamp>,
    #[document(updated_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    pub teacher_id: String,
    pub subject: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<FileRef>,
}

/// Editable lesson fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
}
