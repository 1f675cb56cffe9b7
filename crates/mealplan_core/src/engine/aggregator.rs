//! Shopping-list aggregation over a menu range.
//!
//! # Responsibility
//! - Expand every in-range assignment scaled by its portions.
//! - Merge expanded lines by `(normalized name, unit)` with provenance.
//! - Build fresh lists (`generate`) or re-derive existing ones
//!   (`regenerate`) while keeping user checked/canceled flags.
//!
//! # Invariants
//! - Assignments are processed by date, then in recorded order.
//! - Quantities within a group are summed; sources are concatenated in
//!   processing order, never deduplicated.
//! - Any expansion error aborts the run; no partial list is returned.
//! - Output items are sorted by category, then by ingredient key.

use super::catalog::DishCatalog;
use super::category::CategoryDictionary;
use super::error::{PlanError, PlanResult};
use super::expander::DishExpander;
use crate::model::ingredient::IngredientKey;
use crate::model::menu::{DateRange, MenuAssignment};
use crate::model::shopping::{MealSource, ShoppingList, ShoppingListItem};
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// Builds shopping lists from a catalog snapshot and a category snapshot.
pub struct ShoppingListAggregator<'a, C: DishCatalog + ?Sized> {
    expander: DishExpander<'a, C>,
    categories: &'a CategoryDictionary,
}

struct MergedGroup {
    display_name: String,
    unit: String,
    quantity: f64,
    sources: Vec<MealSource>,
}

impl<'a, C: DishCatalog + ?Sized> ShoppingListAggregator<'a, C> {
    pub fn new(catalog: &'a C, categories: &'a CategoryDictionary) -> Self {
        Self {
            expander: DishExpander::new(catalog),
            categories,
        }
    }

    /// Computes merged, categorized items for the assignments inside `range`.
    ///
    /// Assignments outside `range` are ignored. Returned items are unchecked.
    pub fn compute_items(
        &self,
        range: &DateRange,
        assignments: &[MenuAssignment],
    ) -> PlanResult<Vec<ShoppingListItem>> {
        let mut in_range = assignments
            .iter()
            .filter(|assignment| range.contains(assignment.date))
            .collect::<Vec<_>>();
        // Stable: same-day assignments keep their recorded order.
        in_range.sort_by_key(|assignment| assignment.date);

        let mut index: HashMap<IngredientKey, usize> = HashMap::new();
        let mut groups: Vec<MergedGroup> = Vec::new();

        for assignment in &in_range {
            assignment.validate()?;
            let dish = self
                .expander
                .catalog()
                .dish(&assignment.dish_id)
                .ok_or_else(|| PlanError::DishNotFound(assignment.dish_id.clone()))?;
            let lines = self
                .expander
                .expand(&assignment.dish_id, f64::from(assignment.portions))?;

            for line in lines {
                let source = MealSource {
                    date: assignment.date,
                    meal_type: assignment.meal_type,
                    dish_name: dish.name.clone(),
                };
                let key = line.key();
                match index.get(&key) {
                    Some(&position) => {
                        let group = &mut groups[position];
                        group.quantity += line.quantity;
                        group.sources.push(source);
                    }
                    None => {
                        index.insert(key, groups.len());
                        groups.push(MergedGroup {
                            display_name: line.name.trim().to_string(),
                            unit: line.unit.trim().to_string(),
                            quantity: line.quantity,
                            sources: vec![source],
                        });
                    }
                }
            }
        }

        let mut items = groups
            .into_iter()
            .map(|group| ShoppingListItem {
                category: self.categories.category_for(&group.display_name).to_string(),
                ingredient_name: group.display_name,
                quantity: group.quantity,
                unit: group.unit,
                checked: false,
                canceled: false,
                sources: group.sources,
            })
            .collect::<Vec<_>>();
        items.sort_by(|left, right| {
            left.category
                .cmp(&right.category)
                .then_with(|| left.key().cmp(&right.key()))
        });

        debug!(
            "event=shopping_compute module=engine status=ok assignments={} items={}",
            in_range.len(),
            items.len()
        );
        Ok(items)
    }

    /// Builds a new list for `range` with a fresh id and `created_at = now`.
    pub fn generate(
        &self,
        range: &DateRange,
        assignments: &[MenuAssignment],
    ) -> PlanResult<ShoppingList> {
        self.generate_at(range, assignments, now_epoch_ms())
    }

    /// Same as [`Self::generate`] with an explicit creation timestamp.
    pub fn generate_at(
        &self,
        range: &DateRange,
        assignments: &[MenuAssignment],
        now_ms: i64,
    ) -> PlanResult<ShoppingList> {
        let items = self.compute_items(range, assignments)?;
        Ok(ShoppingList {
            id: Uuid::new_v4(),
            start_date: range.start(),
            end_date: range.end(),
            created_at: now_ms,
            updated_at: None,
            items,
        })
    }

    /// Re-derives `prior` for its own range, keeping item flags.
    ///
    /// # Contract
    /// - `id`, `created_at` and the date range of `prior` are preserved.
    /// - Items whose key existed in `prior` inherit `checked`/`canceled`.
    /// - Items absent from the new computation are dropped.
    pub fn regenerate(
        &self,
        prior: &ShoppingList,
        assignments: &[MenuAssignment],
    ) -> PlanResult<ShoppingList> {
        self.regenerate_at(prior, assignments, now_epoch_ms())
    }

    /// Same as [`Self::regenerate`] with an explicit update timestamp.
    pub fn regenerate_at(
        &self,
        prior: &ShoppingList,
        assignments: &[MenuAssignment],
        now_ms: i64,
    ) -> PlanResult<ShoppingList> {
        let mut items = self.compute_items(&prior.range()?, assignments)?;

        let prior_flags = prior
            .items
            .iter()
            .map(|item| (item.key(), (item.checked, item.canceled)))
            .collect::<HashMap<_, _>>();
        for item in &mut items {
            if let Some(&(checked, canceled)) = prior_flags.get(&item.key()) {
                item.checked = checked;
                item.canceled = canceled;
            }
        }

        Ok(ShoppingList {
            id: prior.id,
            start_date: prior.start_date,
            end_date: prior.end_date,
            created_at: prior.created_at,
            updated_at: Some(now_ms),
            items,
        })
    }
}

/// Current time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
