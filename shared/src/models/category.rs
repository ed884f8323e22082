//! Category Model

use serde::{Deserialize, Serialize};

use super::serde_helpers;
use super::{CollectionKind, Document};
use crate::util;

/// Categories written into an empty namespace
pub const DEFAULT_CATEGORY_NAMES: [&str; 8] = [
    "Vegetables",
    "Meat",
    "Seafood",
    "Fruit",
    "Condiments",
    "Drinks",
    "Snacks",
    "Other",
];

/// Category entity (storage area)
///
/// Names are free text and not unique. Items copy the name into their own
/// `area` field, so a rename only affects the category document itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: util::new_id(),
            name: name.into(),
        }
    }

    /// Same id, new name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            name: name.into(),
        }
    }

    /// Fresh default category set
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CATEGORY_NAMES.iter().map(|name| Self::new(*name)).collect()
    }
}

impl Document for Category {
    const KIND: CollectionKind = CollectionKind::Categories;

    fn id(&self) -> &str {
        &self.id
    }
}
