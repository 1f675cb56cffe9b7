//! Shopping list use-case service.
//!
//! # Responsibility
//! - Load the planning snapshot (assignments, reachable dishes, recipes,
//!   category dictionary) through `PlannerStore`.
//! - Run the pure aggregator and persist its result.
//!
//! # Invariants
//! - All reads happen before aggregation; expansion itself performs no I/O.
//! - A failed generation writes nothing.
//! - Callers serialize `regenerate_and_save` per list id.

use crate::engine::aggregator::ShoppingListAggregator;
use crate::engine::catalog::CatalogSnapshot;
use crate::engine::error::{PlanError, PlanResult};
use crate::model::dish::DishSource;
use crate::model::ingredient::IngredientKey;
use crate::model::menu::{DateRange, MenuAssignment};
use crate::model::shopping::{ShoppingList, ShoppingListId, ShoppingListItem};
use crate::repo::store::PlannerStore;
use crate::repo::RepoError;
use log::{error, info};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

/// Shopping list generation facade.
pub struct ShoppingService<S: PlannerStore> {
    store: S,
    default_category: String,
}

impl<S: PlannerStore> ShoppingService<S> {
    pub fn new(store: S, default_category: impl Into<String>) -> Self {
        Self {
            store,
            default_category: default_category.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Computes a fresh list for `range` without saving it.
    pub fn generate(&self, range: &DateRange) -> PlanResult<ShoppingList> {
        let assignments = self.store.load_menu_assignments(range)?;
        let catalog = self.load_catalog(&assignments)?;
        let categories = self
            .store
            .load_category_dictionary(&self.default_category)?;
        ShoppingListAggregator::new(&catalog, &categories).generate(range, &assignments)
    }

    /// Computes and stores a fresh list for `range`.
    pub fn generate_and_save(&self, range: &DateRange) -> PlanResult<ShoppingList> {
        let started_at = Instant::now();
        info!(
            "event=shopping_generate module=service status=start start={} end={}",
            range.start(),
            range.end()
        );

        let result = self.generate(range).and_then(|list| {
            self.store.save_shopping_list(&list)?;
            Ok(list)
        });
        log_outcome("shopping_generate", started_at, &result);
        result
    }

    /// Re-derives an existing list from the current plan and stores it.
    ///
    /// # Contract
    /// - Keeps list id, range and `created_at`; stamps `updated_at`.
    /// - Keeps `checked`/`canceled` of items whose key survives.
    pub fn regenerate_and_save(&self, list_id: ShoppingListId) -> PlanResult<ShoppingList> {
        let started_at = Instant::now();
        info!("event=shopping_regenerate module=service status=start list_id={list_id}");

        let result = self.regenerate(list_id).and_then(|list| {
            self.store.save_shopping_list(&list)?;
            Ok(list)
        });
        log_outcome("shopping_regenerate", started_at, &result);
        result
    }

    fn regenerate(&self, list_id: ShoppingListId) -> PlanResult<ShoppingList> {
        let prior = self.get(list_id)?;
        let assignments = self.store.load_menu_assignments(&prior.range()?)?;
        let catalog = self.load_catalog(&assignments)?;
        let categories = self
            .store
            .load_category_dictionary(&self.default_category)?;
        ShoppingListAggregator::new(&catalog, &categories).regenerate(&prior, &assignments)
    }

    pub fn get(&self, list_id: ShoppingListId) -> PlanResult<ShoppingList> {
        self.store
            .load_shopping_list(list_id)?
            .ok_or(PlanError::ShoppingListNotFound(list_id))
    }

    /// Sets `checked` on the item `(name, unit)` of a stored list.
    pub fn set_item_checked(
        &self,
        list_id: ShoppingListId,
        name: &str,
        unit: &str,
        checked: bool,
    ) -> PlanResult<ShoppingList> {
        self.update_item(list_id, name, unit, |item| item.checked = checked)
    }

    /// Sets `canceled` on the item `(name, unit)` of a stored list.
    pub fn set_item_canceled(
        &self,
        list_id: ShoppingListId,
        name: &str,
        unit: &str,
        canceled: bool,
    ) -> PlanResult<ShoppingList> {
        self.update_item(list_id, name, unit, |item| item.canceled = canceled)
    }

    fn update_item(
        &self,
        list_id: ShoppingListId,
        name: &str,
        unit: &str,
        apply: impl FnOnce(&mut ShoppingListItem),
    ) -> PlanResult<ShoppingList> {
        let mut list = self.get(list_id)?;
        let key = IngredientKey::new(name, unit);
        let item = list.find_item_mut(&key).ok_or_else(|| {
            PlanError::Persistence(RepoError::NotFound {
                entity: "shopping list item",
                id: format!("{list_id}/{} ({})", key.name, key.unit),
            })
        })?;
        apply(item);
        self.store.save_shopping_list(&list)?;
        Ok(list)
    }

    /// Loads every dish reachable from `assignments` plus linked recipes.
    ///
    /// Missing dishes and recipes are left out; the engine reports them.
    /// Each dish id is loaded at most once, so cyclic data terminates.
    pub fn load_catalog(&self, assignments: &[MenuAssignment]) -> PlanResult<CatalogSnapshot> {
        let mut catalog = CatalogSnapshot::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = assignments
            .iter()
            .map(|assignment| assignment.dish_id.clone())
            .collect();

        while let Some(dish_id) = queue.pop_front() {
            if !seen.insert(dish_id.clone()) {
                continue;
            }
            let Some(dish) = self.store.load_dish(&dish_id)? else {
                continue;
            };
            match &dish.source {
                DishSource::RecipeLinked { recipe_id } => {
                    if !catalog.contains_recipe(recipe_id) {
                        if let Some(recipe) = self.store.load_recipe_ingredients(recipe_id)? {
                            catalog.insert_recipe(recipe);
                        }
                    }
                }
                DishSource::Standalone { .. } => {}
                DishSource::Composite { components } => {
                    queue.extend(
                        components
                            .iter()
                            .map(|component| component.contained_dish_id.clone()),
                    );
                }
            }
            catalog.insert_dish(dish);
        }

        Ok(catalog)
    }
}

fn log_outcome(event: &str, started_at: Instant, result: &PlanResult<ShoppingList>) {
    match result {
        Ok(list) => info!(
            "event={} module=service status=ok list_id={} items={} pending={} duration_ms={}",
            event,
            list.id,
            list.items.len(),
            list.pending_count(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={} module=service status=error duration_ms={} error_code={}",
            event,
            started_at.elapsed().as_millis(),
            error_code(err)
        ),
    }
}

fn error_code(err: &PlanError) -> &'static str {
    match err {
        PlanError::DishNotFound(_) => "dish_not_found",
        PlanError::RecipeNotFound { .. } => "recipe_not_found",
        PlanError::CompositionCycle(_) => "composition_cycle",
        PlanError::InvalidQuantity(_) => "invalid_quantity",
        PlanError::Validation(_) => "invalid_record",
        PlanError::DishInUse { .. } => "dish_in_use",
        PlanError::ShoppingListNotFound(_) => "shopping_list_not_found",
        PlanError::Persistence(_) => "persistence_failed",
    }
}
