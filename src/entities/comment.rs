use serde::{Deserialize, Serialize};

use super::Role;
use crate::document::{timestamp, Timestamp};
use crate::Document;

/// A comment stored under `lessons/{lessonId}/comments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "comments")]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    /// Filled from the storage path on read.
    #[serde(default)]
    pub lesson_id: String,
    pub author_id: String,
    pub author_role: Role,
    pub content: String,
    #[document(created_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub created_at: Option<Timestamp>,
    /// Append-only.
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub author_id: String,
    pub author_role: Role,
    pub content: String,
    #[serde(default, with = "timestamp::lenient")]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author_id: String,
    pub author_role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReply {
    pub author_id: String,
    pub author_role: Role,
    pub content: String,
}
