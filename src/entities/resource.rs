use serde::{Deserialize, Serialize};

use crate::document::{timestamp, Timestamp};
use crate::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Lecture,
    Practice,
    Seminar,
    Lab,
}

impl LessonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Lecture => "lecture",
            LessonType::Practice => "practice",
            LessonType::Seminar => "seminar",
            LessonType::Lab => "lab",
        }
    }
}

impl std::fmt::Display for LessonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A standalone teaching resource scoped to a (group, subject, teacher) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "resources")]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    pub group_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub title: String,
    pub lesson_type: LessonType,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[document(created_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub created_at: Option<Timestamp>,
    #[document(updated_at)]
    #[serde(default, with = "timestamp::lenient")]
    pub updated_at: Option<Timestamp>,
}

/// Resource metadata without the file part, as supplied to an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDraft {
    pub group_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub title: String,
    pub lesson_type: LessonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    #[serde(flatten)]
    pub draft: ResourceDraft,
    pub file_url: String,
    pub file_name: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ResourcePatch {
    pub title: Option<String>,
    pub lesson_type: Option<LessonType>,
    pub description: Option<String>,
    pub group_id: Option<String>,
    pub subject_id: Option<String>,
}
