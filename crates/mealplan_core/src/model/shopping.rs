//! Shopping list records produced by the aggregator.
//!
//! # Invariants
//! - Within one list, items have unique `(normalized name, unit)` keys.
//! - `sources` is additive provenance; duplicates are meaningful.
//! - `id` and `created_at` never change once a list exists; regeneration
//!   only replaces `items` and stamps `updated_at`.

use super::ingredient::IngredientKey;
use super::menu::{DateRange, MealType};
use super::validation::ModelValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable shopping list identifier.
pub type ShoppingListId = Uuid;

/// One meal that contributed to a shopping-list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSource {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub dish_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub ingredient_name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub checked: bool,
    pub canceled: bool,
    pub sources: Vec<MealSource>,
}

impl ShoppingListItem {
    pub fn key(&self) -> IngredientKey {
        IngredientKey::new(&self.ingredient_name, &self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last regeneration, if any.
    pub updated_at: Option<i64>,
    pub items: Vec<ShoppingListItem>,
}

/// Items sharing one category, borrowed from a list.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a ShoppingListItem>,
}

impl ShoppingList {
    /// Date range covered by this list.
    ///
    /// # Errors
    /// - `InvertedDateRange` when the stored dates are out of order.
    pub fn range(&self) -> Result<DateRange, ModelValidationError> {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn find_item(&self, key: &IngredientKey) -> Option<&ShoppingListItem> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn find_item_mut(&mut self, key: &IngredientKey) -> Option<&mut ShoppingListItem> {
        self.items.iter_mut().find(|item| &item.key() == key)
    }

    /// Number of items neither checked nor canceled.
    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !item.checked && !item.canceled)
            .count()
    }

    /// Groups items by category: categories alphabetical, items by name.
    pub fn grouped_by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: BTreeMap<&str, Vec<&ShoppingListItem>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.category.as_str()).or_default().push(item);
        }
        groups
            .into_iter()
            .map(|(category, mut items)| {
                items.sort_by_key(|item| item.key());
                CategoryGroup { category, items }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ShoppingList, ShoppingListItem};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn item(name: &str, category: &str) -> ShoppingListItem {
        ShoppingListItem {
            ingredient_name: name.to_string(),
            quantity: 1.0,
            unit: "pcs".to_string(),
            category: category.to_string(),
            checked: false,
            canceled: false,
            sources: Vec::new(),
        }
    }

    #[test]
    fn grouped_by_category_sorts_groups_and_items() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut list = ShoppingList {
            id: Uuid::new_v4(),
            start_date: date,
            end_date: date,
            created_at: 0,
            updated_at: None,
            items: vec![
                item("Zucchini", "Produce"),
                item("milk", "Dairy"),
                item("apple", "Produce"),
            ],
        };
        list.items[1].checked = true;

        let groups = list.grouped_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Dairy");
        assert_eq!(groups[1].category, "Produce");
        assert_eq!(groups[1].items[0].ingredient_name, "apple");
        assert_eq!(groups[1].items[1].ingredient_name, "Zucchini");
        assert_eq!(list.pending_count(), 2);
    }
}
