//! Integration tests for the portal facade: outcomes, signals and audience views.

mod support;

use edu_portal::signals::{AccessDenied, OrphanBlob};
use edu_portal::{
    CollectionPatch, ErrorCode, FileRef, LessonPatch, NewCollection, Notice, PortalConfig, StoreError, StoreOp,
    ACCESS_DENIED_NOTICE,
};
use serde_json::json;
use support::{channel, draft, harness, harness_with, lesson, received};

#[tokio::test]
async fn permission_code_becomes_access_denied_signal() {
    let h = harness();
    let (listener, rx) = channel::<AccessDenied>();
    h.portal.signals().on_access_denied(listener);
    h.store.fail_next(
        StoreOp::Query,
        StoreError::new("permission-denied", "Missing or insufficient permissions."),
    );

    let outcome = h.portal.student("s1", "G1").resources().await;

    assert!(!outcome.success);
    assert_eq!(outcome.code, Some(ErrorCode::PermissionDenied));
    assert_eq!(outcome.notice(), Some(Notice::AccessDenied(ACCESS_DENIED_NOTICE)));

    let signal = received(&rx);
    assert_eq!(signal.operation, "student.resources");
    assert_eq!(signal.notice, ACCESS_DENIED_NOTICE);
}

#[tokio::test]
async fn permission_message_without_code_is_classified_too() {
    let h = harness();
    let id = h
        .portal
        .teacher("t1")
        .create_lesson(lesson("Osmosis"))
        .await
        .into_result()
        .unwrap();
    h.store.fail_next(
        StoreOp::Update,
        StoreError::message("FirebaseError: Missing or insufficient permissions."),
    );

    let outcome = h.portal.student("s1", "G1").open_lesson(&id).await;
    assert_eq!(outcome.code, Some(ErrorCode::PermissionDenied));
}

#[tokio::test]
async fn validation_failures_make_no_round_trip() {
    let h = harness();

    let outcome = h.portal.teacher("t1").create_lesson(lesson("   ")).await;

    assert_eq!(outcome.code, Some(ErrorCode::Validation));
    assert_eq!(h.store.calls(StoreOp::Add), 0);
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "success": false,
            "error": "validation error: title is required",
            "code": "validation"
        })
    );
}

#[tokio::test]
async fn metadata_failure_after_upload_reports_orphan_blob() {
    let h = harness();
    let (listener, rx) = channel::<OrphanBlob>();
    h.portal.signals().on_orphan_blob(listener);
    h.store
        .fail_next(StoreOp::Add, StoreError::unavailable("backend unavailable"));

    let outcome = h
        .portal
        .teacher("t1")
        .upload_resource(draft("G1"), "cells.png", vec![7; 32])
        .await;

    assert_eq!(outcome.code, Some(ErrorCode::Unavailable));
    assert_eq!(h.blobs.len(), 1);

    let orphan = received(&rx);
    assert_eq!(orphan.owner_id, "t1");
    assert!(orphan.url.contains("resources/t1/"));
    assert!(h.blobs.contains(&orphan.url));
}

#[tokio::test]
async fn blob_left_behind_by_delete_is_reported() {
    let h = harness();
    let (listener, rx) = channel::<OrphanBlob>();
    h.portal.signals().on_orphan_blob(listener);
    let teacher = h.portal.teacher("t1");
    let id = teacher
        .upload_resource(draft("G1"), "notes.pdf", vec![3; 8])
        .await
        .into_result()
        .unwrap();
    h.blobs
        .fail_next_delete(StoreError::unavailable("storage unavailable"));

    let outcome = teacher.delete_resource(&id).await;

    assert!(outcome.success);
    assert_eq!(
        h.portal.resources().get(&id).await.unwrap_err().code(),
        ErrorCode::NotFound
    );
    let orphan = received(&rx);
    assert_eq!(orphan.owner_id, "t1");
    assert!(orphan.url.contains("resources/t1/"));
    assert!(h.blobs.contains(&orphan.url));
}

#[tokio::test]
async fn blob_domain_comes_from_config() {
    let config = PortalConfig::parse("[blobs]\nresources = \"uploads\"").unwrap();
    let h = harness_with(config);

    let id = h
        .portal
        .teacher("t1")
        .upload_resource(draft("G1"), "cells.png", vec![1])
        .await
        .into_result()
        .unwrap();

    let resource = h.portal.resources().get(&id).await.unwrap();
    assert!(resource.file_url.contains("uploads/t1/"));
    assert_eq!(resource.teacher_id, "t1");
}

#[tokio::test]
async fn teachers_cannot_touch_each_others_lessons() {
    let h = harness();
    let id = h
        .portal
        .teacher("t1")
        .create_lesson(lesson("Mitosis"))
        .await
        .into_result()
        .unwrap();

    let outcome = h
        .portal
        .teacher("t2")
        .update_lesson(
            &id,
            LessonPatch {
                title: Some("Hijacked".into()),
                ..LessonPatch::default()
            },
        )
        .await;
    assert_eq!(outcome.code, Some(ErrorCode::PermissionDenied));

    let deleted = h.portal.teacher("t2").delete_lesson(&id).await;
    assert!(!deleted.success);
    assert_eq!(h.portal.lessons().get(&id).await.unwrap().title, "Mitosis");
}

#[tokio::test]
async fn student_views_and_comments_flow_through_counters() {
    let h = harness();
    let teacher = h.portal.teacher("t1");
    let student = h.portal.student("s1", "G1");
    let id = teacher
        .create_lesson(lesson("Photosynthesis"))
        .await
        .into_result()
        .unwrap();

    let opened = student.open_lesson(&id).await.into_result().unwrap();
    assert_eq!(opened.views_count, 1);

    let comment = student.comment(&id, "What about C4 plants?").await.into_result().unwrap();
    teacher.reply(&id, &comment, "Next week.").await.into_result().unwrap();

    let thread = student.comments(&id).await.into_result().unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(h.portal.lessons().get(&id).await.unwrap().comments_count, 1);

    let stranger = h.portal.student("s2", "G1").delete_comment(&id, &comment).await;
    assert_eq!(stranger.code, Some(ErrorCode::PermissionDenied));

    student.delete_comment(&id, &comment).await.into_result().unwrap();
    assert_eq!(h.portal.lessons().get(&id).await.unwrap().comments_count, 0);
}

#[tokio::test]
async fn collection_files_add_remove_round_trip() {
    let h = harness();
    let teacher = h.portal.teacher("t1");
    let id = teacher
        .create_collection(NewCollection {
            teacher_id: String::new(),
            group_id: Some("G1".into()),
            subject_id: "biology".into(),
            title: "Week 1".into(),
            files: vec![FileRef::new("Syllabus", "u0", "syllabus.pdf", 10)],
        })
        .await
        .into_result()
        .unwrap();
    let before = h.portal.collections().get(&id).await.unwrap().files;

    let extra = FileRef::new("Slides", "u1", "slides.pdf", 20);
    teacher.add_file(&id, extra.clone()).await.into_result().unwrap();
    teacher.add_file(&id, extra.clone()).await.into_result().unwrap();
    assert_eq!(h.portal.collections().get(&id).await.unwrap().files.len(), 2);

    teacher.remove_file(&id, extra).await.into_result().unwrap();
    assert_eq!(h.portal.collections().get(&id).await.unwrap().files, before);

    let other = h.portal.teacher("t2").add_file(&id, FileRef::new("x", "u9", "x.pdf", 1)).await;
    assert_eq!(other.code, Some(ErrorCode::PermissionDenied));
}

#[tokio::test]
async fn two_step_replace_restores_on_failure() {
    let config = PortalConfig::parse("replace_strategy = \"two-step\"").unwrap();
    let h = harness_with(config);
    let teacher = h.portal.teacher("t1");
    let old = FileRef::new("Draft", "u1", "draft.pdf", 1);
    let new = FileRef::new("Final", "u2", "final.pdf", 1);
    let id = teacher
        .create_collection(NewCollection {
            teacher_id: String::new(),
            group_id: None,
            subject_id: "biology".into(),
            title: "Reading".into(),
            files: vec![old.clone()],
        })
        .await
        .into_result()
        .unwrap();

    // the remove goes through, the add fails, the restore goes through
    h.store
        .fail_after(StoreOp::Update, 1, StoreError::unavailable("connection reset"));
    let outcome = teacher.replace_file(&id, old.clone(), new).await;

    assert_eq!(outcome.code, Some(ErrorCode::Unavailable));
    assert_eq!(h.portal.collections().get(&id).await.unwrap().files, vec![old]);
}

#[tokio::test]
async fn students_see_group_and_global_collections() {
    let h = harness();
    let teacher = h.portal.teacher("t1");
    let mut ids = Vec::new();
    for group in [Some("G1"), None, Some("G2")] {
        let id = teacher
            .create_collection(NewCollection {
                teacher_id: String::new(),
                group_id: group.map(String::from),
                subject_id: "biology".into(),
                title: format!("{:?}", group),
                files: vec![],
            })
            .await
            .into_result()
            .unwrap();
        ids.push(id);
    }

    let mut seen: Vec<String> = h
        .portal
        .student("s1", "G1")
        .collections("biology")
        .await
        .into_result()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    seen.sort();
    let mut expected = vec![ids[0].clone(), ids[1].clone()];
    expected.sort();
    assert_eq!(seen, expected);

    teacher
        .update_collection(
            &ids[2],
            CollectionPatch {
                group_id: Some(None),
                ..CollectionPatch::default()
            },
        )
        .await
        .into_result()
        .unwrap();
    let widened = h.portal.student("s1", "G1").collections("biology").await;
    assert_eq!(widened.data.map(|c| c.len()), Some(3));
}

#[tokio::test]
async fn admin_recount_and_teacher_list() {
    let h = harness();
    let teacher = h.portal.teacher("t1");
    let id = teacher.create_lesson(lesson("Enzymes")).await.into_result().unwrap();
    teacher.create_lesson(lesson("Genetics")).await.into_result().unwrap();
    h.portal.teacher("t2").create_lesson(lesson("Ecology")).await.into_result().unwrap();

    assert_eq!(teacher.lessons().await.data.map(|l| l.len()), Some(2));

    h.portal.student("s1", "G1").comment(&id, "hi").await.into_result().unwrap();
    assert_eq!(h.portal.admin("root").recount_comments(&id).await.data, Some(1));

    h.portal.admin("root").delete_lesson(&id).await.into_result().unwrap();
    assert_eq!(
        h.portal.admin("root").recount_comments(&id).await.code,
        Some(ErrorCode::NotFound)
    );
}
