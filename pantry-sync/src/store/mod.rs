//! Remote Store Module
//!
//! 远端文档存储的抽象层。仓库层只依赖 [`RemoteStore`] trait：
//!
//! ```text
//! CollectionRepository<T>
//!         │  list / put / remove / watch
//!         ▼
//!   dyn RemoteStore ──┬── MemoryStore  (同进程，测试与本地模式)
//!                     └── HttpStore    (REST 文档 API + 轮询变更检测)
//! ```
//!
//! Documents cross this boundary as raw JSON objects; typing happens in the
//! repository so a malformed document can be skipped instead of failing the
//! whole collection.

pub mod http;
pub mod memory;
pub mod path;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use path::CollectionPath;

use async_trait::async_trait;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of each per-collection change channel
pub const WATCH_CHANNEL_CAPACITY: usize = 64;

/// Store error types
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Network failure or the store is temporarily unreachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but refused the request
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Malformed store response: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Transient failures are worth retrying by the caller
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Unavailable(_) => AppError::store_unavailable(err.to_string()),
            StoreError::Rejected { status, .. } => {
                AppError::with_message(ErrorCode::InvalidRequest, err.to_string())
                    .with_detail("status", *status)
            }
            StoreError::Malformed(_) => AppError::malformed(err.to_string()),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification emitted for a watched collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    /// Something in the collection changed; re-read to get the new snapshot
    Changed,
    /// The watcher could not observe the collection; the last snapshot may be stale
    Degraded(String),
}

/// A per-user document store with change notification
///
/// Writes are keyed by document id and fully replace any existing document.
/// Deleting a missing id succeeds. Nothing here retries: failures go straight
/// back to the caller.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// One-shot read of every document in the collection
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<Value>>;

    /// Create or fully replace the document with this id
    async fn put(&self, path: &CollectionPath, id: &str, doc: Value) -> StoreResult<()>;

    /// Remove the document; a missing id is not an error
    async fn remove(&self, path: &CollectionPath, id: &str) -> StoreResult<()>;

    /// Register for change notices on a collection.
    ///
    /// Must be called from within a tokio runtime: backends that need a
    /// watcher task spawn it here.
    fn watch(&self, path: &CollectionPath) -> broadcast::Receiver<ChangeNotice>;
}
