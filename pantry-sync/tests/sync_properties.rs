//! Repository and subscription behaviour against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pantry_sync::repository::RepoError;
use pantry_sync::{MemoryStore, PantryRepository, SubscriptionEvent, UserScope};
use shared::models::{Category, Item, ItemDraft};
use tokio::sync::mpsc;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn repo_for(store: &Arc<MemoryStore>, user: &str) -> PantryRepository {
    PantryRepository::new(store.clone(), UserScope::new(user).unwrap())
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let store = Arc::new(MemoryStore::new());
    let alice = repo_for(&store, "alice");
    let bob = repo_for(&store, "bob");

    alice.items().upsert(&Item::new("Milk", day(1))).await.unwrap();

    assert_eq!(alice.items().fetch_all().await.unwrap().len(), 1);
    assert!(bob.items().fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rename_category_leaves_item_area() {
    let store = Arc::new(MemoryStore::new());
    let repo = repo_for(&store, "u1");

    repo.seed_default_categories().await.unwrap();
    let drinks: Category = repo
        .categories()
        .fetch_all()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Drinks")
        .unwrap();
    repo.items()
        .upsert(&Item::new("Juice", day(4)).with_area("Drinks"))
        .await
        .unwrap();

    repo.rename_category(&drinks.id, "Beverages").await.unwrap();

    let items = repo.items().fetch_all().await.unwrap();
    assert_eq!(items[0].area, "Drinks");
    let names: Vec<String> = repo
        .categories()
        .fetch_all()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert!(names.contains(&"Beverages".to_string()));
    assert!(!names.contains(&"Drinks".to_string()));
}

#[tokio::test]
async fn test_subscriptions_on_two_devices_converge() {
    let store = Arc::new(MemoryStore::new());
    let phone = repo_for(&store, "u1");
    let tablet = repo_for(&store, "u1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sub = tablet.items().subscribe(move |event| {
        let _ = tx.send(event);
    });

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first, SubscriptionEvent::Snapshot(Vec::new()));

    let milk = Item::new("Milk", day(2));
    phone.items().upsert(&milk).await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(next, SubscriptionEvent::Snapshot(vec![milk.clone()]));

    phone.items().delete(&milk.id).await.unwrap();
    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(next, SubscriptionEvent::Snapshot(Vec::new()));

    sub.close().await;
}

#[tokio::test]
async fn test_import_reports_partial_progress() {
    let store = Arc::new(MemoryStore::new());
    let repo = repo_for(&store, "u1");

    let written = repo
        .import_items(
            vec![
                ItemDraft {
                    expiry_date: Some("2024-07-01".into()),
                    ..ItemDraft::new("Butter")
                },
                ItemDraft {
                    days_left: Some("x".into()),
                    expiry_date: Some("not-a-date".into()),
                    ..ItemDraft::new("Mystery")
                },
            ],
            day(1),
        )
        .await
        .unwrap();
    assert_eq!(written, 2);

    // Unparseable dates round-trip verbatim and sort last
    let items = repo.items().fetch_all().await.unwrap();
    assert_eq!(items[0].expiry_date, "2024-07-01");
    assert_eq!(items[1].expiry_date, "not-a-date");

    store.set_offline(true);
    let err = repo
        .import_items(vec![ItemDraft::new("Tea")], day(1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::ImportAborted { written: 0, .. }));
}
