//! Session / Scope Resolver
//!
//! 当前用户会话 → 用户命名空间 (`users/{id}/...`)。
//!
//! ```text
//! SessionProvider::current_user()
//!         │ Some(UserSession)        None
//!         ▼                           ▼
//!   UserScope::from_session      调用方短路 (成功, 无副作用)
//! ```
//!
//! The scope is resolved fresh on every call; nothing caches it across the
//! foreground and background contexts.

pub mod file;
pub mod scope;

pub use file::FileSessionStore;
pub use scope::{InvalidScope, UserScope};

use parking_lot::RwLock;
use shared::error::{AppError, ErrorCode};
use shared::models::UserSession;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidScope(#[from] InvalidScope),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidScope(e) => AppError::with_message(ErrorCode::InvalidCollectionPath, e.to_string()),
            other => AppError::with_message(ErrorCode::SessionPersistFailed, other.to_string()),
        }
    }
}

/// Source of the current user
pub trait SessionProvider: Send + Sync {
    /// `None` when nobody is logged in
    fn current_user(&self) -> Option<UserSession>;
}

/// Resolve the current scope.
///
/// A session with an id that cannot form a namespace is treated as no session.
pub fn resolve_scope(provider: &dyn SessionProvider) -> Option<UserScope> {
    let session = provider.current_user()?;
    match UserScope::from_session(&session) {
        Ok(scope) => Some(scope),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring session with unusable user id");
            None
        }
    }
}

/// In-memory provider for embedding and tests
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    current: RwLock<Option<UserSession>>,
}

impl StaticSessionProvider {
    pub fn new(session: Option<UserSession>) -> Self {
        Self {
            current: RwLock::new(session),
        }
    }

    pub fn signed_in(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(Some(UserSession::new(id, label)))
    }

    pub fn set(&self, session: Option<UserSession>) {
        *self.current.write() = session;
    }
}

impl SessionProvider for StaticSessionProvider {
    fn current_user(&self) -> Option<UserSession> {
        self.current.read().clone()
    }
}
