//! Typed collection access

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use shared::models::{CollectionKind, Document};

use super::subscription::{Subscription, SubscriptionEvent};
use super::{RepoError, RepoResult};
use crate::session::UserScope;
use crate::store::{CollectionPath, RemoteStore};

/// CRUD plus live subscription over one user collection
///
/// Writes go straight to the store and are awaited; nothing is retried here.
pub struct CollectionRepository<T: Document> {
    store: Arc<dyn RemoteStore>,
    path: CollectionPath,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for CollectionRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> std::fmt::Debug for CollectionRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRepository")
            .field("path", &self.path)
            .finish()
    }
}

impl<T: Document> CollectionRepository<T> {
    pub fn new(store: Arc<dyn RemoteStore>, scope: &UserScope) -> Self {
        Self {
            path: scope.collection_path(T::KIND),
            store,
            _marker: PhantomData,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        T::KIND
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Create or fully replace the document with the same id
    pub async fn upsert(&self, doc: &T) -> RepoResult<()> {
        if doc.id().trim().is_empty() {
            return Err(RepoError::Validation(format!("{} document has an empty id", T::KIND)));
        }
        let value = serde_json::to_value(doc).map_err(|e| RepoError::Encode(e.to_string()))?;
        self.store.put(&self.path, doc.id(), value).await?;
        tracing::debug!(collection = %self.path, id = %doc.id(), "Document upserted");
        Ok(())
    }

    /// Delete by id; a missing id is a successful no-op
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        self.store.remove(&self.path, id).await?;
        tracing::debug!(collection = %self.path, id = %id, "Document deleted");
        Ok(())
    }

    /// One-shot read of the whole collection, decoded and ordered
    pub async fn fetch_all(&self) -> RepoResult<Vec<T>> {
        let raw = self.store.list(&self.path).await?;
        Ok(decode_snapshot(&self.path, raw))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        Ok(self.fetch_all().await?.into_iter().find(|doc| doc.id() == id))
    }

    /// Open a live listener.
    ///
    /// `on_change` first receives the current snapshot, then a fresh snapshot
    /// after every change. Calls for one subscription never overlap.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: FnMut(SubscriptionEvent<T>) + Send + 'static,
    {
        Subscription::spawn(self.clone(), on_change)
    }

    pub(crate) fn watch(&self) -> tokio::sync::broadcast::Receiver<crate::store::ChangeNotice> {
        self.store.watch(&self.path)
    }
}

/// Decode raw documents: malformed ones are skipped, duplicate ids keep the first
pub(crate) fn decode_snapshot<T: Document>(path: &CollectionPath, raw: Vec<Value>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut docs = Vec::with_capacity(raw.len());

    for value in raw {
        match serde_json::from_value::<T>(value) {
            Ok(doc) => {
                if doc.id().is_empty() {
                    tracing::warn!(collection = %path, "Skipping document without id");
                    continue;
                }
                if !seen.insert(doc.id().to_string()) {
                    tracing::warn!(collection = %path, id = %doc.id(), "Skipping duplicate document");
                    continue;
                }
                docs.push(doc);
            }
            Err(e) => {
                tracing::warn!(collection = %path, error = %e, "Skipping malformed document");
            }
        }
    }

    T::sort_snapshot(&mut docs);
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use shared::models::{Category, Item};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, CollectionRepository<Item>) {
        let store = Arc::new(MemoryStore::new());
        let scope = UserScope::new("u1").unwrap();
        let repo = CollectionRepository::new(store.clone(), &scope);
        (store, repo)
    }

    #[tokio::test]
    async fn test_upsert_then_read_returns_equal_record() {
        let (_, repo) = setup();
        let item = Item::new("Milk", date(2024, 6, 1)).with_area("Drinks").with_quantity(2);
        repo.upsert(&item).await.unwrap();

        assert_eq!(repo.fetch_all().await.unwrap(), vec![item.clone()]);
        assert_eq!(repo.find_by_id(&item.id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_upsert_is_full_replacement() {
        let (_, repo) = setup();
        let mut item = Item::new("Milk", date(2024, 6, 1)).with_notes("2%");
        repo.upsert(&item).await.unwrap();

        item.notes.clear();
        item.quantity = 3;
        repo.upsert(&item).await.unwrap();

        let all = repo.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].notes, "");
        assert_eq!(all[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let (_, repo) = setup();
        let mut item = Item::new("Milk", date(2024, 6, 1));
        item.id = String::new();
        assert!(matches!(repo.upsert(&item).await, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let (_, repo) = setup();
        let item = Item::new("Milk", date(2024, 6, 1));
        repo.upsert(&item).await.unwrap();

        repo.delete("does-not-exist").await.unwrap();
        assert_eq!(repo.fetch_all().await.unwrap(), vec![item]);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_to_caller() {
        let (store, repo) = setup();
        store.set_offline(true);
        let err = repo.upsert(&Item::new("Milk", date(2024, 6, 1))).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_skips_malformed_and_sorts() {
        let (store, repo) = setup();
        let path = repo.path().clone();
        store
            .put(&path, "late", serde_json::json!({ "id": "late", "name": "Rice", "expiryDate": "2024-09-01" }))
            .await
            .unwrap();
        store
            .put(&path, "soon", serde_json::json!({ "id": "soon", "name": "Milk", "expiryDate": "2024-06-01", "quantity": "abc" }))
            .await
            .unwrap();
        store
            .put(&path, "bad", serde_json::json!({ "name": "No id" }))
            .await
            .unwrap();
        store
            .put(&path, "odd", serde_json::json!({ "id": "odd", "name": "Jam", "expiryDate": "someday" }))
            .await
            .unwrap();

        let items = repo.fetch_all().await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "late", "odd"]);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_decode_dedupes_by_id() {
        let path = CollectionPath::user_collection("u1", CollectionKind::Categories);
        let raw = vec![
            serde_json::json!({ "id": "c1", "name": "Fridge" }),
            serde_json::json!({ "id": "c1", "name": "Freezer" }),
        ];
        let cats: Vec<Category> = decode_snapshot(&path, raw);
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Fridge");
    }
}
