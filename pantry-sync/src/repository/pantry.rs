//! PantryRepository - 一个用户的三个集合

use std::sync::Arc;

use chrono::NaiveDate;
use shared::models::{Category, Item, ItemDraft, Recipe};

use super::collection::CollectionRepository;
use super::{RepoError, RepoResult};
use crate::session::UserScope;
use crate::store::RemoteStore;

/// Items, categories and recipes of one user
#[derive(Debug, Clone)]
pub struct PantryRepository {
    scope: UserScope,
    items: CollectionRepository<Item>,
    categories: CollectionRepository<Category>,
    recipes: CollectionRepository<Recipe>,
}

impl PantryRepository {
    pub fn new(store: Arc<dyn RemoteStore>, scope: UserScope) -> Self {
        Self {
            items: CollectionRepository::new(store.clone(), &scope),
            categories: CollectionRepository::new(store.clone(), &scope),
            recipes: CollectionRepository::new(store, &scope),
            scope,
        }
    }

    pub fn scope(&self) -> &UserScope {
        &self.scope
    }

    pub fn items(&self) -> &CollectionRepository<Item> {
        &self.items
    }

    pub fn categories(&self) -> &CollectionRepository<Category> {
        &self.categories
    }

    pub fn recipes(&self) -> &CollectionRepository<Recipe> {
        &self.recipes
    }

    /// Bulk import (receipt scanning).
    ///
    /// Drafts are written one at a time, each awaited. Drafts with a blank name
    /// are skipped. The first failed write stops the import; items already
    /// written stay written. Returns the number of items written.
    pub async fn import_items(&self, drafts: Vec<ItemDraft>, today: NaiveDate) -> RepoResult<usize> {
        let total = drafts.len();
        let mut written = 0;

        for draft in drafts {
            let Some(item) = draft.into_item(today) else {
                tracing::debug!("Skipping import row without a name");
                continue;
            };
            if let Err(e) = self.items.upsert(&item).await {
                tracing::warn!(user = %self.scope.user_id(), written, error = %e, "Bulk import aborted");
                return Err(RepoError::ImportAborted {
                    written,
                    source: Box::new(e),
                });
            }
            written += 1;
        }

        tracing::info!(user = %self.scope.user_id(), written, total, "Bulk import finished");
        Ok(written)
    }

    /// Rename a category in place.
    ///
    /// Items keep the old name in their `area` field.
    pub async fn rename_category(&self, id: &str, new_name: &str) -> RepoResult<Category> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(RepoError::Validation("category name must not be empty".to_string()));
        }
        let current = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("category {}", id)))?;

        let renamed = current.renamed(new_name);
        self.categories.upsert(&renamed).await?;
        tracing::info!(id = %id, from = %current.name, to = %renamed.name, "Category renamed");
        Ok(renamed)
    }

    /// Write the default categories into an empty namespace.
    ///
    /// Returns how many were written (0 when categories already exist).
    pub async fn seed_default_categories(&self) -> RepoResult<usize> {
        if !self.categories.fetch_all().await?.is_empty() {
            return Ok(0);
        }
        let defaults = Category::defaults();
        for category in &defaults {
            self.categories.upsert(category).await?;
        }
        tracing::info!(user = %self.scope.user_id(), count = defaults.len(), "Default categories seeded");
        Ok(defaults.len())
    }
}
