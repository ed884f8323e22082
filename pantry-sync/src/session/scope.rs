use shared::models::{CollectionKind, UserSession};
use thiserror::Error;

use crate::store::CollectionPath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidScope {
    #[error("user id is empty")]
    Empty,
    #[error("user id contains a path separator: {0}")]
    Separator(String),
}

/// Namespace of one user; every repository is built from one of these
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserScope {
    user_id: String,
}

impl UserScope {
    pub fn new(user_id: impl Into<String>) -> Result<Self, InvalidScope> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(InvalidScope::Empty);
        }
        if user_id.contains('/') {
            return Err(InvalidScope::Separator(user_id));
        }
        Ok(Self { user_id })
    }

    pub fn from_session(session: &UserSession) -> Result<Self, InvalidScope> {
        Self::new(session.id.clone())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// `users/{id}/{foods|areas|recipes}`
    pub fn collection_path(&self, kind: CollectionKind) -> CollectionPath {
        CollectionPath::user_collection(&self.user_id, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unusable_ids() {
        assert_eq!(UserScope::new(""), Err(InvalidScope::Empty));
        assert_eq!(UserScope::new("   "), Err(InvalidScope::Empty));
        assert!(matches!(UserScope::new("a/b"), Err(InvalidScope::Separator(_))));
    }

    #[test]
    fn test_collection_paths() {
        let scope = UserScope::new("uid-42").unwrap();
        assert_eq!(scope.collection_path(CollectionKind::Items).as_str(), "users/uid-42/foods");
        assert_eq!(scope.collection_path(CollectionKind::Categories).as_str(), "users/uid-42/areas");
        assert_eq!(scope.collection_path(CollectionKind::Recipes).as_str(), "users/uid-42/recipes");
    }
}
