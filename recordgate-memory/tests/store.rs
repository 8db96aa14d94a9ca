use bson::{Bson, doc};
use recordgate_core::{
    backend::{StoreBackend, StoreBackendBuilder, UpdateOutcome},
    error::GatewayError,
    query::FindOptions,
};
use recordgate_memory::{InMemoryStore, InMemoryStoreBuilder};

async fn seeded() -> InMemoryStore {
    let store = InMemoryStore::builder().build().await.unwrap();

    for (id, post, active) in [("c3", "p1", true), ("c1", "p1", true), ("c2", "p2", false)] {
        store
            .insert_document(doc! { "_id": id, "postId": post, "active": active }, "comment")
            .await
            .unwrap();
    }

    store
}

#[tokio::test]
async fn counts_and_finds_with_filters() {
    let store = seeded().await;

    assert_eq!(store.count_documents(doc! { "active": true }, "comment").await.unwrap(), 2);
    assert_eq!(store.count_documents(doc! {}, "comment").await.unwrap(), 3);
    assert_eq!(store.count_documents(doc! {}, "missing").await.unwrap(), 0);

    let found = store
        .find_one_document(doc! { "_id": "c2" }, "comment")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get_str("postId").unwrap(), "p2");
}

#[tokio::test]
async fn find_sorts_ascending_then_pages() {
    let store = seeded().await;

    let all = store
        .find_documents(doc! {}, FindOptions::new(0, 10, "_id"), "comment")
        .await
        .unwrap();
    let ids = all.iter().map(|d| d.get_str("_id").unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);

    let second = store
        .find_documents(doc! {}, FindOptions::new(1, 1, "_id"), "comment")
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].get_str("_id").unwrap(), "c2");
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let store = seeded().await;

    let result = store.insert_document(doc! { "_id": "c1" }, "comment").await;

    assert!(matches!(result, Err(GatewayError::Backend(_))));
}

#[tokio::test]
async fn missing_ids_are_generated() {
    let store = InMemoryStore::new();

    store.insert_document(doc! { "text": "hello" }, "comment").await.unwrap();

    let stored = store.documents("comment").await;
    assert!(matches!(stored[0].get("_id"), Some(Bson::ObjectId(_))));
}

#[tokio::test]
async fn update_sets_fields_and_reports_counts() {
    let store = seeded().await;

    let outcome = store
        .update_one_document(doc! { "_id": "c1" }, doc! { "text": "edited" }, "comment")
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

    let repeat = store
        .update_one_document(doc! { "_id": "c1" }, doc! { "text": "edited" }, "comment")
        .await
        .unwrap();
    assert_eq!(repeat, UpdateOutcome { matched: 1, modified: 0 });

    let missing = store
        .update_one_document(doc! { "_id": "nope" }, doc! { "text": "edited" }, "comment")
        .await
        .unwrap();
    assert_eq!(missing, UpdateOutcome::default());

    let stored = store
        .find_one_document(doc! { "_id": "c1" }, "comment")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, doc! { "_id": "c1", "postId": "p1", "active": true, "text": "edited" });
}

#[tokio::test]
async fn clones_share_state() {
    let store = InMemoryStore::new();
    let clone = store.clone();

    clone.insert_document(doc! { "_id": "c1" }, "comment").await.unwrap();

    assert_eq!(store.collections().await, vec!["comment".to_string()]);
}

#[tokio::test]
async fn non_memory_urls_fail_to_build() {
    let builder = InMemoryStoreBuilder::new("mongodb://localhost:27017");
    assert_eq!(builder.target(), "mongodb://localhost:27017");

    let result = builder.build().await;

    assert!(matches!(result, Err(GatewayError::Connection { .. })));
}

#[tokio::test]
async fn generated_object_ids_sort_ascending() {
    let store = InMemoryStore::new();
    let ids = (1..=5u8)
        .rev()
        .map(|n| bson::oid::ObjectId::from_bytes([0, 0, 0, n, 0, 0, 0, 0, 0, 0, 0, 0]))
        .collect::<Vec<_>>();

    for id in &ids {
        store.insert_document(doc! { "_id": (*id) }, "comment").await.unwrap();
    }

    let found = store
        .find_documents(doc! {}, FindOptions::new(0, 10, "_id"), "comment")
        .await
        .unwrap();
    let order = found
        .iter()
        .map(|d| d.get_object_id("_id").unwrap())
        .collect::<Vec<_>>();

    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn update_with_dotted_keys_sets_nested_fields() {
    let store = InMemoryStore::new();
    store
        .insert_document(doc! { "_id": "c1", "author": { "name": "Ana" } }, "comment")
        .await
        .unwrap();

    let outcome = store
        .update_one_document(doc! { "_id": "c1" }, doc! { "author.name": "Bea" }, "comment")
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

    let stored = store.documents("comment").await;
    assert_eq!(stored[0], doc! { "_id": "c1", "author": { "name": "Bea" } });
}
