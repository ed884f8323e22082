//! Shared types for Pantry
//!
//! Entity models, wire document shapes, error codes and small utilities
//! used by the sync core and by any front-end that talks to it.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{Category, CollectionKind, Document, Item, ItemDraft, Recipe, UserSession};
pub use serde::{Deserialize, Serialize};
