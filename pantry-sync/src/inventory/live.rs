//! LiveInventory - 前台实时视图

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use super::view::InventoryView;
use crate::repository::{PantryRepository, Subscription};

/// Three live subscriptions folded into one shared view
pub struct LiveInventory {
    view: Arc<RwLock<InventoryView>>,
    revision: watch::Receiver<u64>,
    subscriptions: Vec<Subscription>,
}

impl LiveInventory {
    /// Open subscriptions on items, categories and recipes
    pub fn open(repo: &PantryRepository) -> Self {
        let view = Arc::new(RwLock::new(InventoryView::default()));
        let (tx, revision) = watch::channel(0u64);
        let tx = Arc::new(tx);

        let items = {
            let (view, tx) = (view.clone(), tx.clone());
            repo.items().subscribe(move |event| {
                view.write().apply_items(event);
                tx.send_modify(|rev| *rev += 1);
            })
        };
        let categories = {
            let (view, tx) = (view.clone(), tx.clone());
            repo.categories().subscribe(move |event| {
                view.write().apply_categories(event);
                tx.send_modify(|rev| *rev += 1);
            })
        };
        let recipes = {
            let (view, tx) = (view.clone(), tx);
            repo.recipes().subscribe(move |event| {
                view.write().apply_recipes(event);
                tx.send_modify(|rev| *rev += 1);
            })
        };

        tracing::info!(user = %repo.scope().user_id(), "Live inventory opened");
        Self {
            view,
            revision,
            subscriptions: vec![items, categories, recipes],
        }
    }

    /// Copy of the current view
    pub fn snapshot(&self) -> InventoryView {
        self.view.read().clone()
    }

    /// Run `f` against the current view without cloning it
    pub fn with_view<R>(&self, f: impl FnOnce(&InventoryView) -> R) -> R {
        f(&self.view.read())
    }

    /// Receiver that ticks after every applied event
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }

    /// Release all three subscriptions
    pub async fn close(self) {
        for subscription in self.subscriptions {
            subscription.close().await;
        }
        tracing::debug!("Live inventory closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserScope;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use shared::models::{CollectionKind, Item};
    use std::time::Duration;

    async fn wait_until(inventory: &LiveInventory, check: impl Fn(&InventoryView) -> bool) {
        let mut changes = inventory.changes();
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if inventory.with_view(&check) {
                    return;
                }
                if changes.changed().await.is_err() {
                    return;
                }
            }
        })
        .await
        .expect("view never reached the expected state");
    }

    #[tokio::test]
    async fn test_view_follows_remote_changes() {
        let store = Arc::new(MemoryStore::new());
        let repo = PantryRepository::new(store.clone(), UserScope::new("u1").unwrap());
        repo.seed_default_categories().await.unwrap();

        let inventory = LiveInventory::open(&repo);
        wait_until(&inventory, |v| v.categories().len() == 8).await;

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        repo.items().upsert(&Item::new("Milk", day).with_area("Drinks")).await.unwrap();
        wait_until(&inventory, |v| v.items().len() == 1).await;

        let groups = inventory.snapshot().grouped("");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Drinks");

        store.set_offline(true);
        store.notify_remote_change(repo.items().path());
        wait_until(&inventory, |v| v.is_stale(CollectionKind::Items)).await;
        assert_eq!(inventory.snapshot().items().len(), 1);

        inventory.close().await;
    }
}
