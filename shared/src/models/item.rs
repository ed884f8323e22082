//! Item Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::serde_helpers;
use super::{CollectionKind, Document};
use crate::util;

/// Area assigned to items created without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Days added to "today" when a new item has no explicit expiry date
pub const DEFAULT_SHELF_LIFE_DAYS: i64 = 7;

/// Item entity (a perishable unit)
///
/// Wire shape: `{ id, name, expiryDate, area, notes, quantity }`.
///
/// `expiry_date` is kept as the raw string so a document written with an
/// unparseable date still round-trips unchanged. `area` is a copy of the
/// category *name*, not a reference: renaming a category leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub expiry_date: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub area: String,
    #[serde(default, deserialize_with = "serde_helpers::string_or_empty")]
    pub notes: String,
    #[serde(
        default = "serde_helpers::default_quantity",
        deserialize_with = "serde_helpers::quantity"
    )]
    pub quantity: u32,
}

impl Item {
    /// Create a new item with a fresh id, no notes, quantity 1 and the
    /// "Uncategorized" area.
    pub fn new(name: impl Into<String>, expiry: NaiveDate) -> Self {
        Self {
            id: util::new_id(),
            name: name.into(),
            expiry_date: util::format_iso_date(expiry),
            area: UNCATEGORIZED.to_string(),
            notes: String::new(),
            quantity: 1,
        }
    }

    /// Default expiry for a freshly created item
    pub fn default_expiry(today: NaiveDate) -> NaiveDate {
        today + chrono::Duration::days(DEFAULT_SHELF_LIFE_DAYS)
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set quantity, clamping to >= 1
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Set quantity from user text; non-numeric input falls back to 1
    pub fn with_quantity_text(mut self, raw: &str) -> Self {
        self.quantity = serde_helpers::parse_quantity(raw);
        self
    }

    /// Parsed expiry date, `None` when the stored string is not a calendar date
    pub fn expiry(&self) -> Option<NaiveDate> {
        util::parse_iso_date(&self.expiry_date)
    }

    /// Whole days from `today` until expiry (negative once expired)
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry().map(|date| util::days_between(today, date))
    }

    /// Case-insensitive match on name or area. A blank query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.area.to_lowercase().contains(&needle)
    }
}

impl Document for Item {
    const KIND: CollectionKind = CollectionKind::Items;

    fn id(&self) -> &str {
        &self.id
    }

    /// Ascending by expiry date; unparseable dates sort last, ties keep snapshot order
    fn sort_snapshot(docs: &mut [Self]) {
        docs.sort_by_cached_key(|item| match item.expiry() {
            Some(date) => (0u8, Some(date)),
            None => (1u8, None),
        });
    }
}

/// A row produced by bulk import (e.g. receipt scanning) before it becomes an [`Item`]
///
/// Quantity and "days left" arrive as user-editable text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub quantity: String,
    /// Explicit date, kept verbatim
    #[serde(default)]
    pub expiry_date: Option<String>,
    /// Days from today; wins over `expiry_date` when it parses
    #[serde(default)]
    pub days_left: Option<String>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Resolve the draft into an item. Drafts with a blank name are rejected.
    pub fn into_item(self, today: NaiveDate) -> Option<Item> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }

        let from_days = self
            .days_left
            .as_deref()
            .and_then(|d| d.trim().parse::<i64>().ok())
            .map(|days| util::format_iso_date(today + chrono::Duration::days(days)));

        let expiry_date = from_days
            .or(self.expiry_date)
            .unwrap_or_else(|| util::format_iso_date(Item::default_expiry(today)));

        Some(Item {
            id: util::new_id(),
            name: name.to_string(),
            expiry_date,
            area: self
                .area
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            notes: self.notes,
            quantity: serde_helpers::parse_quantity(&self.quantity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let item = Item {
            id: "i1".into(),
            name: "Milk".into(),
            expiry_date: "2024-06-01".into(),
            area: "Drinks".into(),
            notes: "2%".into(),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "i1",
                "name": "Milk",
                "expiryDate": "2024-06-01",
                "area": "Drinks",
                "notes": "2%",
                "quantity": 2
            })
        );
        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_tolerant_quantity_on_read() {
        let cases = [
            (serde_json::json!("4"), 4),
            (serde_json::json!("many"), 1),
            (serde_json::json!(0), 1),
            (serde_json::json!(-3), 1),
            (serde_json::json!(null), 1),
            (serde_json::json!(2.0), 2),
            (serde_json::json!([1]), 1),
        ];
        for (raw, expected) in cases {
            let doc = serde_json::json!({ "id": "x", "name": "Eggs", "quantity": raw });
            let item: Item = serde_json::from_value(doc).unwrap();
            assert_eq!(item.quantity, expected);
        }

        let missing: Item = serde_json::from_value(serde_json::json!({ "id": "x" })).unwrap();
        assert_eq!(missing.quantity, 1);
        assert_eq!(missing.expiry_date, "");
    }

    #[test]
    fn test_days_until_expiry() {
        let today = date(2024, 6, 1);
        let item = Item::new("Milk", date(2024, 6, 4));
        assert_eq!(item.days_until_expiry(today), Some(3));

        let mut broken = item.clone();
        broken.expiry_date = "next tuesday".into();
        assert_eq!(broken.days_until_expiry(today), None);
    }

    #[test]
    fn test_sort_snapshot_orders_by_date_with_unparseable_last() {
        let mut docs = vec![
            Item::new("C", date(2024, 6, 9)),
            Item::new("A", date(2024, 6, 1)).with_notes("x"),
            Item::new("B", date(2024, 6, 5)),
        ];
        docs[1].expiry_date = "garbage".into();
        docs.push(Item::new("D", date(2024, 6, 1)));

        Item::sort_snapshot(&mut docs);
        let names: Vec<_> = docs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_matches_query() {
        let item = Item::new("Greek Yogurt", date(2024, 6, 1)).with_area("Fridge Door");
        assert!(item.matches_query(""));
        assert!(item.matches_query("yog"));
        assert!(item.matches_query("DOOR"));
        assert!(!item.matches_query("cheese"));
    }

    #[test]
    fn test_draft_resolution() {
        let today = date(2024, 6, 1);

        let mut draft = ItemDraft::new("  Bread ");
        draft.quantity = "two".into();
        draft.days_left = Some("2".into());
        draft.expiry_date = Some("2030-01-01".into());
        let item = draft.into_item(today).unwrap();
        assert_eq!(item.name, "Bread");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.expiry_date, "2024-06-03");
        assert_eq!(item.area, UNCATEGORIZED);

        let mut draft = ItemDraft::new("Cheese");
        draft.quantity = "3".into();
        draft.area = Some("Dairy".into());
        draft.days_left = Some("soon".into());
        draft.expiry_date = Some("2024-06-20".into());
        let item = draft.into_item(today).unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.area, "Dairy");
        assert_eq!(item.expiry_date, "2024-06-20");

        let item = ItemDraft::new("Apples").into_item(today).unwrap();
        assert_eq!(item.expiry_date, "2024-06-08");

        assert!(ItemDraft::new("   ").into_item(today).is_none());
    }
}
