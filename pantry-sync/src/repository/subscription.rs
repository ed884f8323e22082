//! Live subscriptions
//!
//! 每个订阅一个 tokio 任务，串行消费该集合的变更通知：
//!
//! ```text
//! RemoteStore::watch ──► broadcast::Receiver<ChangeNotice>
//!                               │
//!                               ▼
//!                 consumer task (one per subscription)
//!                  ├─ Changed / Lagged → drain → fetch_all → Snapshot
//!                  ├─ fetch failed     → Degraded
//!                  └─ Degraded(reason) → Degraded
//! ```

use shared::models::{CollectionKind, Document};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::collection::CollectionRepository;
use crate::store::ChangeNotice;

/// What a subscriber receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent<T> {
    /// Complete, ordered contents of the collection
    Snapshot(Vec<T>),
    /// A refresh failed; the last snapshot may be stale
    Degraded(String),
}

/// Owned handle of a live listener
///
/// Dropping the handle stops delivery; [`Subscription::close`] also waits
/// for an in-flight callback to return.
#[derive(Debug)]
pub struct Subscription {
    kind: CollectionKind,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn spawn<T, F>(repo: CollectionRepository<T>, mut on_change: F) -> Self
    where
        T: Document,
        F: FnMut(SubscriptionEvent<T>) + Send + 'static,
    {
        // Register before the initial read so no change can slip in between
        let mut rx = repo.watch();
        let token = CancellationToken::new();
        let task_token = token.clone();
        let kind = repo.kind();

        let handle = tokio::spawn(async move {
            tracing::debug!(collection = %repo.path(), "Subscription opened");
            refresh(&repo, &mut on_change, &task_token).await;

            loop {
                let notice = tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    notice = rx.recv() => notice,
                };

                match notice {
                    Ok(ChangeNotice::Changed) | Err(RecvError::Lagged(_)) => {
                        // Coalesce a burst of notices into one read
                        loop {
                            match rx.try_recv() {
                                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                            }
                        }
                        refresh(&repo, &mut on_change, &task_token).await;
                    }
                    Ok(ChangeNotice::Degraded(reason)) => {
                        if task_token.is_cancelled() {
                            break;
                        }
                        tracing::warn!(collection = %repo.path(), reason = %reason, "Subscription degraded");
                        on_change(SubscriptionEvent::Degraded(reason));
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!(collection = %repo.path(), "Change feed closed");
                        break;
                    }
                }
            }

            tracing::debug!(collection = %repo.path(), "Subscription closed");
        });

        Self {
            kind,
            token,
            handle: Some(handle),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop delivery and wait for the consumer task to finish
    pub async fn close(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!(kind = %self.kind, error = ?e, "Subscription task panicked");
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn refresh<T, F>(repo: &CollectionRepository<T>, on_change: &mut F, token: &CancellationToken)
where
    T: Document,
    F: FnMut(SubscriptionEvent<T>),
{
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = repo.fetch_all() => result,
    };
    if token.is_cancelled() {
        return;
    }

    match result {
        Ok(docs) => on_change(SubscriptionEvent::Snapshot(docs)),
        Err(e) => {
            tracing::warn!(collection = %repo.path(), error = %e, "Subscription refresh failed");
            on_change(SubscriptionEvent::Degraded(e.to_string()));
        }
    }
}
