//! Integration tests for denormalized counters on lessons.

mod support;

use edu_portal::{
    Actor, CollectionPath, CounterStrategy, DocumentStore, InMemoryDocumentStore, LessonRepository, Patch, Role,
};
use support::Classroom;

#[tokio::test]
async fn comments_count_follows_live_comments() {
    let class = Classroom::new(InMemoryDocumentStore::new(), CounterStrategy::Atomic);
    let lesson = class.lesson().await;

    let mut ids = Vec::new();
    for author in ["s1", "s2", "s3"] {
        ids.push(class.comment(&lesson, author).await);
    }
    assert_eq!(class.comments_count(&lesson).await, 3);
    assert_eq!(class.comments.count(&lesson).await.unwrap(), 3);

    class
        .comments
        .delete(&lesson, &ids[0], &Actor::new("s1", Role::Student))
        .await
        .unwrap();
    assert_eq!(class.comments_count(&lesson).await, 2);
    assert_eq!(class.comments.count(&lesson).await.unwrap(), 2);
}

#[tokio::test]
async fn comments_count_never_goes_negative() {
    for strategy in [CounterStrategy::Atomic, CounterStrategy::ReadModifyWrite] {
        let class = Classroom::new(InMemoryDocumentStore::new(), strategy);
        let lesson = class.lesson().await;
        let comment = class.comment(&lesson, "s1").await;

        // drift the counter below the live count
        class
            .store
            .update(&LessonRepository::<InMemoryDocumentStore>::path(&lesson), Patch::new().set("commentsCount", 0))
            .await
            .unwrap();

        class
            .comments
            .delete(&lesson, &comment, &Actor::new("admin", Role::Admin))
            .await
            .unwrap();
        assert_eq!(class.comments_count(&lesson).await, 0, "{:?}", strategy);
    }
}

#[tokio::test]
async fn blind_increment_can_lose_a_concurrent_update() {
    let class = Classroom::new(InMemoryDocumentStore::interleaved(), CounterStrategy::ReadModifyWrite);
    let lesson = class.lesson().await;

    let (first, second) = tokio::join!(class.lessons.record_view(&lesson), class.lessons.record_view(&lesson));
    first.unwrap();
    second.unwrap();

    // both callers read 0 before either wrote
    assert_eq!(class.views_count(&lesson).await, 1);
}

#[tokio::test]
async fn atomic_increment_keeps_concurrent_updates() {
    let class = Classroom::new(InMemoryDocumentStore::interleaved(), CounterStrategy::Atomic);
    let lesson = class.lesson().await;

    let (first, second) = tokio::join!(class.lessons.record_view(&lesson), class.lessons.record_view(&lesson));
    first.unwrap();
    second.unwrap();

    assert_eq!(class.views_count(&lesson).await, 2);
}

#[tokio::test]
async fn deleting_a_lesson_deletes_its_comments() {
    let class = Classroom::new(InMemoryDocumentStore::new(), CounterStrategy::Atomic);
    let lesson = class.lesson().await;
    for author in ["s1", "s2", "s3"] {
        class.comment(&lesson, author).await;
    }
    let comments = CollectionPath::root("lessons").doc(&lesson).collection("comments");
    assert_eq!(class.store.len(&comments), 3);

    class.lessons.delete(&lesson).await.unwrap();

    assert!(class.store.is_empty(&comments));
    assert!(class.lessons.get(&lesson).await.is_err());
}

#[tokio::test]
async fn without_cascade_comments_are_left_behind() {
    let store = InMemoryDocumentStore::new();
    let class = Classroom::new(store.clone(), CounterStrategy::Atomic);
    let lesson = class.lesson().await;
    class.comment(&lesson, "s1").await;

    class.lessons.clone().with_cascade(false).delete(&lesson).await.unwrap();

    let comments = CollectionPath::root("lessons").doc(&lesson).collection("comments");
    assert_eq!(store.len(&comments), 1);
}

#[tokio::test]
async fn recount_after_out_of_band_delete() {
    let class = Classroom::new(InMemoryDocumentStore::new(), CounterStrategy::Atomic);
    let lesson = class.lesson().await;
    let doomed = class.comment(&lesson, "s1").await;
    class.comment(&lesson, "s2").await;

    let comments = CollectionPath::root("lessons").doc(&lesson).collection("comments");
    class.store.delete(&comments.doc(&doomed)).await.unwrap();
    assert_eq!(class.comments_count(&lesson).await, 2);

    let reconciled = class.comments.recount(&lesson).await.unwrap();
    assert!(reconciled.drifted());
    assert_eq!(class.comments_count(&lesson).await, 1);
}
