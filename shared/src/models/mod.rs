//! Data models
//!
//! Documents stored in the per-user remote collections, plus the session
//! identity that scopes them. All document IDs are client-generated strings.

pub mod category;
pub mod item;
pub mod recipe;
pub mod serde_helpers;
pub mod session;

// Re-exports
pub use category::*;
pub use item::*;
pub use recipe::*;
pub use session::*;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// The three logical collections under a user namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Items,
    Categories,
    Recipes,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Items,
        CollectionKind::Categories,
        CollectionKind::Recipes,
    ];

    /// Path segment used by the remote store
    pub const fn segment(&self) -> &'static str {
        match self {
            CollectionKind::Items => "foods",
            CollectionKind::Categories => "areas",
            CollectionKind::Recipes => "recipes",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// A document type stored in one of the user collections
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection this type lives in
    const KIND: CollectionKind;

    /// Stable, client-generated identifier
    fn id(&self) -> &str;

    /// Order applied to every snapshot before it is handed to consumers
    fn sort_snapshot(_docs: &mut [Self]) {}
}
