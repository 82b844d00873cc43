#![allow(dead_code)]

use std::sync::Once;

use edu_portal::{CollectionPath, DocumentStore, InMemoryDocumentStore, Timestamp};
use serde_json::{json, Map, Value};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

pub fn at(millis: i64) -> Value {
    Timestamp::from_millis(millis).to_value()
}

/// Writes a resource collection with a fixed id and creation time.
pub async fn seed_collection(
    store: &InMemoryDocumentStore,
    id: &str,
    subject: &str,
    group: Option<&str>,
    created_millis: Option<i64>,
) {
    let mut data = fields(json!({
        "teacherId": "t1",
        "subjectId": subject,
        "groupId": group,
        "title": format!("collection {}", id),
        "files": [],
    }));
    if let Some(millis) = created_millis {
        data.insert("createdAt".into(), at(millis));
    }
    store
        .set(&CollectionPath::root("resourceCollections").doc(id), data)
        .await
        .unwrap();
}

/// Writes a resource with a fixed id and an arbitrary `createdAt` value.
pub async fn seed_resource(store: &InMemoryDocumentStore, id: &str, teacher: (&str, &str), created_at: Value) {
    store
        .set(
            &CollectionPath::root("resources").doc(id),
            fields(json!({
                "groupId": "G1",
                "subjectId": "physics",
                "teacherId": teacher.0,
                "teacherName": teacher.1,
                "title": id,
                "lessonType": "lecture",
                "fileUrl": format!("memory://blobs/{}", id),
                "fileName": format!("{}.pdf", id),
                "fileSize": 1,
                "createdAt": created_at,
            })),
        )
        .await
        .unwrap();
}
