//! HTTP document store
//!
//! REST 文档 API：
//!
//! | 操作 | 请求 |
//! |------|------|
//! | list | `GET {base}/{collection}` → JSON 数组 |
//! | put | `PUT {base}/{collection}/{id}` |
//! | remove | `DELETE {base}/{collection}/{id}` (404 视为成功) |
//!
//! The API has no push channel, so `watch` starts one poller task per
//! collection. The poller hashes each listing and emits
//! [`ChangeNotice::Changed`] on its first listing and whenever the digest
//! moves, or [`ChangeNotice::Degraded`] once per outage. A poller stops on its
//! own when its last receiver is dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use reqwest::StatusCode;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::{ChangeNotice, CollectionPath, RemoteStore, StoreError, StoreResult, WATCH_CHANNEL_CAPACITY};

/// HTTP-backed [`RemoteStore`]
#[derive(Debug, Clone)]
pub struct HttpStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    watchers: DashMap<CollectionPath, broadcast::Sender<ChangeNotice>>,
    shutdown: CancellationToken,
}

impl HttpStore {
    /// Build a store client.
    ///
    /// `timeout` bounds every request so background scans never wait forever.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                poll_interval,
                watchers: DashMap::new(),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Stop every poller
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    fn collection_url(&self, path: &CollectionPath) -> String {
        format!("{}/{}", self.inner.base_url, path)
    }

    fn document_url(&self, path: &CollectionPath, id: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.document(id))
    }

    fn notify(&self, path: &CollectionPath, notice: ChangeNotice) {
        if let Some(tx) = self.inner.watchers.get(path) {
            let _ = tx.send(notice);
        }
    }

    fn spawn_poller(&self, path: CollectionPath, tx: broadcast::Sender<ChangeNotice>) {
        let store = self.clone();
        tokio::spawn(async move {
            store.poll_loop(path, tx).await;
        });
    }

    async fn poll_loop(&self, path: CollectionPath, tx: broadcast::Sender<ChangeNotice>) {
        tracing::debug!(collection = %path, "Collection poller started");
        let mut last_digest: Option<String> = None;
        let mut degraded = false;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.inner.poll_interval) => {}
                _ = self.inner.shutdown.cancelled() => break,
            }

            if tx.receiver_count() == 0 {
                // Remove only if nobody re-registered a fresh sender meanwhile
                self.inner
                    .watchers
                    .remove_if(&path, |_, current| current.same_channel(&tx));
                break;
            }

            match self.list(&path).await {
                Ok(docs) => {
                    let digest = digest_documents(&docs);
                    // The first listing has no baseline: a write may have landed
                    // between the watcher's own snapshot and this poll
                    let changed = last_digest.as_ref().is_none_or(|d| d != &digest);
                    if changed || degraded {
                        let _ = tx.send(ChangeNotice::Changed);
                    }
                    if degraded {
                        tracing::info!(collection = %path, "Collection poller recovered");
                    }
                    degraded = false;
                    last_digest = Some(digest);
                }
                Err(e) => {
                    if !degraded {
                        tracing::warn!(collection = %path, error = %e, "Collection poll failed");
                        let _ = tx.send(ChangeNotice::Degraded(e.to_string()));
                    }
                    degraded = true;
                }
            }
        }

        tracing::debug!(collection = %path, "Collection poller stopped");
    }
}

/// SHA-256 over the canonical JSON of a listing
fn digest_documents(docs: &[Value]) -> String {
    let mut hasher = Sha256::new();
    for doc in docs {
        hasher.update(doc.to_string().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn map_send_error(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(StoreError::Unavailable(format!("{status}: {message}")))
    } else {
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<Value>> {
        let response = self
            .inner
            .client
            .get(self.collection_url(path))
            .send()
            .await
            .map_err(map_send_error)?;

        // An empty collection may not exist yet on the server
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = check_status(response).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn put(&self, path: &CollectionPath, id: &str, doc: Value) -> StoreResult<()> {
        let response = self
            .inner
            .client
            .put(self.document_url(path, id))
            .json(&doc)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response).await?;
        self.notify(path, ChangeNotice::Changed);
        Ok(())
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> StoreResult<()> {
        let response = self
            .inner
            .client
            .delete(self.document_url(path, id))
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response).await?;
        self.notify(path, ChangeNotice::Changed);
        Ok(())
    }

    fn watch(&self, path: &CollectionPath) -> broadcast::Receiver<ChangeNotice> {
        match self.inner.watchers.entry(path.clone()) {
            Entry::Occupied(entry) => entry.get().subscribe(),
            Entry::Vacant(entry) => {
                let (tx, rx) = broadcast::channel(WATCH_CHANNEL_CAPACITY);
                entry.insert(tx.clone());
                self.spawn_poller(path.clone(), tx);
                rx
            }
        }
    }
}
