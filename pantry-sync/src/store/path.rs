use shared::models::CollectionKind;
use std::fmt;

/// Slash-separated collection path, e.g. `users/{uid}/foods`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Path of one of the three collections under a user namespace.
    ///
    /// The caller guarantees `user_id` is a single non-empty segment
    /// (see `UserScope`).
    pub fn user_collection(user_id: &str, kind: CollectionKind) -> Self {
        Self(format!("users/{}/{}", user_id, kind.segment()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of a single document in this collection
    pub fn document(&self, id: &str) -> String {
        format!("{}/{}", self.0, id)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_collection_paths() {
        assert_eq!(
            CollectionPath::user_collection("u1", CollectionKind::Items).as_str(),
            "users/u1/foods"
        );
        assert_eq!(
            CollectionPath::user_collection("u1", CollectionKind::Categories).to_string(),
            "users/u1/areas"
        );
        assert_eq!(
            CollectionPath::user_collection("u1", CollectionKind::Recipes).document("r9"),
            "users/u1/recipes/r9"
        );
    }
}
