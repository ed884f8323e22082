//! InventoryView - 当前快照

use std::collections::{HashMap, HashSet};

use shared::models::{Category, CollectionKind, Item, Recipe};

use crate::repository::SubscriptionEvent;

/// Heading for items whose area matches no category
pub const OTHERS_GROUP: &str = "Others";

/// Items listed under one category heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaGroup {
    pub name: String,
    pub items: Vec<Item>,
}

/// Latest snapshots of the three collections
#[derive(Debug, Clone, Default)]
pub struct InventoryView {
    items: Vec<Item>,
    categories: Vec<Category>,
    recipes: Vec<Recipe>,
    stale: HashSet<CollectionKind>,
}

impl InventoryView {
    /// Items sorted by expiry date
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// The last refresh of this collection failed
    pub fn is_stale(&self, kind: CollectionKind) -> bool {
        self.stale.contains(&kind)
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Case-insensitive match on name or area; a blank query returns everything
    pub fn search(&self, query: &str) -> Vec<&Item> {
        self.items.iter().filter(|item| item.matches_query(query)).collect()
    }

    /// Search results grouped by category, in category order.
    ///
    /// Items whose area names no category end up in a trailing
    /// [`OTHERS_GROUP`]. Categories sharing a name form one group. Empty
    /// groups are left out.
    pub fn grouped(&self, query: &str) -> Vec<AreaGroup> {
        let mut by_area: HashMap<&str, Vec<Item>> = HashMap::new();
        for item in self.search(query) {
            by_area.entry(item.area.as_str()).or_default().push(item.clone());
        }

        let mut groups = Vec::new();
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                continue;
            }
            if let Some(items) = by_area.remove(category.name.as_str()) {
                groups.push(AreaGroup {
                    name: category.name.clone(),
                    items,
                });
            }
        }

        if !by_area.is_empty() {
            // Keep expiry order across the leftover areas
            let mut others: Vec<Item> = by_area.into_values().flatten().collect();
            <Item as shared::models::Document>::sort_snapshot(&mut others);
            groups.push(AreaGroup {
                name: OTHERS_GROUP.to_string(),
                items: others,
            });
        }
        groups
    }

    pub(crate) fn apply_items(&mut self, event: SubscriptionEvent<Item>) {
        if let Some(items) = self.mark(CollectionKind::Items, event) {
            self.items = items;
        }
    }

    pub(crate) fn apply_categories(&mut self, event: SubscriptionEvent<Category>) {
        if let Some(categories) = self.mark(CollectionKind::Categories, event) {
            self.categories = categories;
        }
    }

    pub(crate) fn apply_recipes(&mut self, event: SubscriptionEvent<Recipe>) {
        if let Some(recipes) = self.mark(CollectionKind::Recipes, event) {
            self.recipes = recipes;
        }
    }

    /// Degraded keeps the previous snapshot and marks it stale
    fn mark<T>(&mut self, kind: CollectionKind, event: SubscriptionEvent<T>) -> Option<Vec<T>> {
        match event {
            SubscriptionEvent::Snapshot(docs) => {
                self.stale.remove(&kind);
                Some(docs)
            }
            SubscriptionEvent::Degraded(_) => {
                self.stale.insert(kind);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn cat(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
        }
    }

    fn view() -> InventoryView {
        let mut view = InventoryView::default();
        view.apply_categories(SubscriptionEvent::Snapshot(vec![
            cat("c1", "Drinks"),
            cat("c2", "Meat"),
            cat("c3", "Drinks"),
            cat("c4", "Snacks"),
        ]));
        view.apply_items(SubscriptionEvent::Snapshot(vec![
            Item::new("Milk", day(2)).with_area("Drinks"),
            Item::new("Steak", day(3)).with_area("Meat"),
            Item::new("Juice", day(4)).with_area("Drinks"),
            Item::new("Jam", day(5)),
            Item::new("Tofu", day(6)).with_area("Fridge"),
        ]));
        view
    }

    fn names(group: &AreaGroup) -> Vec<&str> {
        group.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_grouping_follows_category_order() {
        let groups = view().grouped("");
        let headings: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(headings, vec!["Drinks", "Meat", "Others"]);
        assert_eq!(names(&groups[0]), vec!["Milk", "Juice"]);
        assert_eq!(names(&groups[2]), vec!["Jam", "Tofu"]);

        let total: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name_and_area() {
        let view = view();
        assert_eq!(view.search("MILK").len(), 1);
        assert_eq!(view.search("drinks").len(), 2);
        assert_eq!(view.search("  ").len(), 5);
        assert!(view.grouped("nothing-matches").is_empty());
    }

    #[test]
    fn test_degraded_keeps_last_snapshot() {
        let mut view = view();
        view.apply_items(SubscriptionEvent::Degraded("offline".into()));
        assert!(view.is_stale(CollectionKind::Items));
        assert_eq!(view.items().len(), 5);

        view.apply_items(SubscriptionEvent::Snapshot(Vec::new()));
        assert!(!view.is_stale(CollectionKind::Items));
        assert!(view.items().is_empty());
    }
}
