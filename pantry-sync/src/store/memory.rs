//! In-process document store
//!
//! 同进程存储：每个集合一个 `BTreeMap<id, doc>`，每个集合一个 broadcast 通道。
//! 可切换离线模式以模拟网络中断。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;

use super::{ChangeNotice, CollectionPath, RemoteStore, StoreError, StoreResult, WATCH_CHANNEL_CAPACITY};

/// In-memory [`RemoteStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<CollectionPath, BTreeMap<String, Value>>,
    watchers: DashMap<CollectionPath, broadcast::Sender<ChangeNotice>>,
    offline: AtomicBool,
    /// Number of upcoming `list` calls that fail (test hook for degraded delivery)
    failing_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        tracing::debug!(offline, "MemoryStore connectivity changed");
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Make the next `count` reads fail without touching writes
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Emit a change notice as if another device had written to the collection
    pub fn notify_remote_change(&self, path: &CollectionPath) {
        self.notify(path, ChangeNotice::Changed);
    }

    /// Number of documents currently stored in a collection
    pub fn len(&self, path: &CollectionPath) -> usize {
        self.collections.get(path).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, path: &CollectionPath) -> bool {
        self.len(path) == 0
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.is_offline() {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    fn take_read_failure(&self) -> bool {
        self.failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn notify(&self, path: &CollectionPath, notice: ChangeNotice) {
        if let Some(tx) = self.watchers.get(path) {
            // No receivers is fine: nobody is watching right now
            let _ = tx.send(notice);
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<Value>> {
        self.check_online()?;
        if self.take_read_failure() {
            return Err(StoreError::Unavailable("simulated read failure".to_string()));
        }
        Ok(self
            .collections
            .get(path)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put(&self, path: &CollectionPath, id: &str, doc: Value) -> StoreResult<()> {
        self.check_online()?;
        if !doc.is_object() {
            return Err(StoreError::Rejected {
                status: 400,
                message: format!("document {} is not an object", id),
            });
        }
        self.collections
            .entry(path.clone())
            .or_default()
            .insert(id.to_string(), doc);
        self.notify(path, ChangeNotice::Changed);
        Ok(())
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> StoreResult<()> {
        self.check_online()?;
        let removed = self
            .collections
            .get_mut(path)
            .and_then(|mut c| c.remove(id))
            .is_some();
        if removed {
            self.notify(path, ChangeNotice::Changed);
        }
        Ok(())
    }

    fn watch(&self, path: &CollectionPath) -> broadcast::Receiver<ChangeNotice> {
        self.watchers
            .entry(path.clone())
            .or_insert_with(|| broadcast::channel(WATCH_CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CollectionKind;

    fn foods() -> CollectionPath {
        CollectionPath::user_collection("u1", CollectionKind::Items)
    }

    #[tokio::test]
    async fn test_put_replaces_whole_document() {
        let store = MemoryStore::new();
        store
            .put(&foods(), "a", serde_json::json!({ "id": "a", "name": "Milk", "notes": "x" }))
            .await
            .unwrap();
        store
            .put(&foods(), "a", serde_json::json!({ "id": "a", "name": "Oat Milk" }))
            .await
            .unwrap();

        let docs = store.list(&foods()).await.unwrap();
        assert_eq!(docs, vec![serde_json::json!({ "id": "a", "name": "Oat Milk" })]);
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok_and_silent() {
        let store = MemoryStore::new();
        let mut rx = store.watch(&foods());
        store.remove(&foods(), "nope").await.unwrap();
        assert!(rx.try_recv().is_err());
        assert!(store.is_empty(&foods()));
    }

    #[tokio::test]
    async fn test_offline_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(store.list(&foods()).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.put(&foods(), "a", serde_json::json!({ "id": "a" })).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.remove(&foods(), "a").await, Err(StoreError::Unavailable(_))));

        store.set_offline(false);
        assert!(store.list(&foods()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_notify_only_their_collection() {
        let store = MemoryStore::new();
        let areas = CollectionPath::user_collection("u1", CollectionKind::Categories);
        let mut food_rx = store.watch(&foods());
        let mut area_rx = store.watch(&areas);

        store
            .put(&foods(), "a", serde_json::json!({ "id": "a" }))
            .await
            .unwrap();

        assert_eq!(food_rx.try_recv().unwrap(), ChangeNotice::Changed);
        assert!(area_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fail_next_reads_is_consumed() {
        let store = MemoryStore::new();
        store.fail_next_reads(1);
        assert!(store.list(&foods()).await.is_err());
        assert!(store.list(&foods()).await.is_ok());
    }
}
