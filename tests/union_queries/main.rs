//! Integration tests for disjunctive queries, merging and ordering.

mod support;

use edu_portal::{
    union_by_identity, CollectionPath, CollectionRepository, CounterMaintainer, Direction, DocumentStore,
    InMemoryBlobStore, InMemoryDocumentStore, OrderBy, Query, QueryRouter, Resource, ResourceCollection,
    ResourceFilter, ResourceRepository, StoreOp,
};
use serde_json::{json, Value};
use support::{at, init_tracing, seed_collection, seed_resource};

fn collections(store: &InMemoryDocumentStore) -> CollectionRepository<InMemoryDocumentStore> {
    init_tracing();
    CollectionRepository::new(store.clone(), CounterMaintainer::new(store.clone()))
}

fn ids<T: edu_portal::Document>(items: &[T]) -> Vec<&str> {
    items.iter().map(|item| item.id()).collect()
}

#[tokio::test]
async fn overlapping_results_merge_to_a_b_c() {
    let store = InMemoryDocumentStore::new();
    for (id, millis) in [("a", 1), ("b", 2), ("c", 3)] {
        seed_collection(&store, id, "S1", Some("G1"), Some(millis)).await;
    }
    let repo = collections(&store);
    let get = |id: &'static str| {
        let repo = repo.clone();
        async move { repo.get(id).await.unwrap() }
    };

    let first = vec![get("a").await, get("b").await];
    let second = vec![get("b").await, get("c").await];

    let merged = union_by_identity(vec![first.clone(), second.clone()]);
    assert_eq!(ids(&merged), vec!["a", "b", "c"]);

    let reversed = union_by_identity(vec![second, first]);
    let mut reversed_ids = ids(&reversed);
    reversed_ids.sort();
    assert_eq!(reversed_ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn group_and_global_collections_are_merged_newest_first() {
    let store = InMemoryDocumentStore::new();
    seed_collection(&store, "mine-old", "S1", Some("G1"), Some(1_000)).await;
    seed_collection(&store, "global", "S1", None, Some(3_000)).await;
    seed_collection(&store, "mine-new", "S1", Some("G1"), Some(2_000)).await;
    seed_collection(&store, "undated", "S1", Some("G1"), None).await;
    seed_collection(&store, "other-group", "S1", Some("G2"), Some(9_000)).await;
    seed_collection(&store, "other-subject", "S2", None, Some(9_000)).await;

    let visible = collections(&store).visible_to("S1", "G1").await.unwrap();

    assert_eq!(ids(&visible), vec!["global", "mine-new", "mine-old", "undated"]);
    assert_eq!(store.calls(StoreOp::Query), 2);
}

#[tokio::test]
async fn a_missing_group_field_is_not_global() {
    let store = InMemoryDocumentStore::new();
    store
        .set(
            &CollectionPath::root("resourceCollections").doc("legacy"),
            support::fields(json!({ "teacherId": "t1", "subjectId": "S1", "title": "legacy" })),
        )
        .await
        .unwrap();

    assert!(collections(&store).visible_to("S1", "G1").await.unwrap().is_empty());
}

#[tokio::test]
async fn descending_sort_is_stable_and_puts_missing_timestamps_last() {
    let store = InMemoryDocumentStore::new();
    seed_resource(&store, "t3", ("teacher", "T"), at(3_000)).await;
    seed_resource(&store, "t1", ("teacher", "T"), at(1_000)).await;
    seed_resource(&store, "t2", ("teacher", "T"), at(2_000)).await;
    seed_resource(&store, "x-none", ("teacher", "T"), Value::Null).await;
    seed_resource(&store, "y-garbage", ("teacher", "T"), json!("not a date")).await;

    let router = QueryRouter::new(store.clone());
    let query = Query::new(CollectionPath::root("resources"))
        .eq("groupId", "G1")
        .order_by(OrderBy::CreatedAt(Direction::Descending));
    let sorted: Vec<Resource> = router.run(&query).await.unwrap();

    assert_eq!(ids(&sorted), vec!["t3", "t2", "t1", "x-none", "y-garbage"]);
}

#[tokio::test]
async fn rfc3339_and_millis_timestamps_sort_together() {
    let store = InMemoryDocumentStore::new();
    seed_resource(&store, "iso", ("teacher", "T"), json!("1970-01-01T00:00:02Z")).await;
    seed_resource(&store, "millis", ("teacher", "T"), json!(3_000)).await;
    seed_resource(&store, "native", ("teacher", "T"), at(1_000)).await;

    let sorted: Vec<Resource> = QueryRouter::new(store)
        .run(&Query::new(CollectionPath::root("resources")))
        .await
        .unwrap();

    assert_eq!(ids(&sorted), vec!["millis", "iso", "native"]);
}

#[tokio::test]
async fn distinct_teachers_are_labeled_from_first_carrier() {
    init_tracing();
    let store = InMemoryDocumentStore::new();
    seed_resource(&store, "r1", ("t-ivanova", "Dr. Ivanova"), at(3_000)).await;
    seed_resource(&store, "r2", ("t-petrov", "Petrov"), at(2_000)).await;
    seed_resource(&store, "r3", ("t-ivanova", "Ivanova (old)"), at(1_000)).await;

    let repo = ResourceRepository::new(store, InMemoryBlobStore::new());
    let teachers = repo.teachers(&ResourceFilter::group("G1")).await.unwrap();

    let pairs: Vec<(&str, &str)> = teachers
        .iter()
        .map(|t| (t.value.as_str(), t.label.as_str()))
        .collect();
    assert_eq!(pairs, vec![("t-ivanova", "Dr. Ivanova"), ("t-petrov", "Petrov")]);
}

#[tokio::test]
async fn a_failing_branch_fails_the_whole_union() {
    let store = InMemoryDocumentStore::new();
    seed_collection(&store, "global", "S1", None, Some(1)).await;
    store.fail_after(
        StoreOp::Query,
        1,
        edu_portal::StoreError::unavailable("backend unavailable"),
    );

    let err = collections(&store).visible_to("S1", "G1").await.unwrap_err();
    assert!(err.code().is_retryable());
}

#[tokio::test]
async fn collections_decode_into_entities() {
    let store = InMemoryDocumentStore::new();
    seed_collection(&store, "c1", "S1", None, Some(5)).await;

    let found: ResourceCollection = collections(&store).get("c1").await.unwrap();
    assert_eq!(found.group_id, None);
    assert_eq!(found.created_at.map(|t| t.as_millis()), Some(5));
}
