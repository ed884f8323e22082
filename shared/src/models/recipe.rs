//! Recipe Model

use serde::{Deserialize, Serialize};

use super::serde_helpers;
use super::{CollectionKind, Document};
use crate::util;

/// Recipe entity
///
/// Created from generated text only; afterwards it is read-only apart from deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub content: String,
}

impl Recipe {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: util::new_id(),
            name: name.into(),
            content: content.into(),
        }
    }
}

impl Document for Recipe {
    const KIND: CollectionKind = CollectionKind::Recipes;

    fn id(&self) -> &str {
        &self.id
    }
}
