//! Portal entities as stored in the document store (camelCase fields).

mod collection;
mod comment;
mod lesson;
mod resource;

use serde::{Deserialize, Serialize};

use crate::document::{timestamp, Timestamp};

pub use collection::{CollectionPatch, NewCollection, ResourceCollection};
pub use comment::{Comment, NewComment, NewReply, Reply};
pub use lesson::{Lesson, LessonPatch, NewLesson};
pub use resource::{LessonType, NewResource, Resource, ResourceDraft, ResourcePatch};

/// The three portal audiences. Also recorded as the author role of comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// An embedded reference to an uploaded file.
///
/// Membership in array fields is decided by deep equality of the serialized
/// record, so a reference must be passed back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub title: String,
    pub url: String,
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default, with = "timestamp::lenient")]
    pub uploaded_at: Option<Timestamp>,
}

impl FileRef {
    pub fn new(title: &str, url: &str, file_name: &str, file_size: u64) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            file_name: file_name.to_string(),
            file_size,
            uploaded_at: Some(Timestamp::now()),
        }
    }
}
