//! Repository Module
//!
//! Per-user CRUD and live subscriptions over the three collections
//! (`foods`, `areas`, `recipes`), on top of any [`RemoteStore`].
//!
//! - [`CollectionRepository`] - typed access to one collection
//! - [`Subscription`] - owned handle of a live listener
//! - [`PantryRepository`] - the three collections of one user plus bulk operations
//!
//! [`RemoteStore`]: crate::store::RemoteStore

pub mod collection;
pub mod pantry;
pub mod subscription;

pub use collection::CollectionRepository;
pub use pantry::PantryRepository;
pub use subscription::{Subscription, SubscriptionEvent};

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::StoreError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bulk import stopped at the first failed write
    #[error("Import aborted after {written} item(s): {source}")]
    ImportAborted {
        written: usize,
        source: Box<RepoError>,
    },
}

impl RepoError {
    pub fn is_transient(&self) -> bool {
        match self {
            RepoError::Store(e) => e.is_transient(),
            RepoError::ImportAborted { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Encode(msg) => AppError::with_message(ErrorCode::InvalidFormat, msg),
            RepoError::Store(e) => e.into(),
            RepoError::ImportAborted { written, source } => {
                AppError::from(*source).with_detail("written", written)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = RepoError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
        assert!(err.is_transient());

        let err: AppError = RepoError::ImportAborted {
            written: 2,
            source: Box::new(RepoError::Store(StoreError::Unavailable("down".into()))),
        }
        .into();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
        assert_eq!(err.details.unwrap()["written"], 2);

        let err: AppError = RepoError::NotFound("category c1".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
