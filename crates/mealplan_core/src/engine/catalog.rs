//! Per-serving ingredient resolution for a single dish.
//!
//! # Responsibility
//! - Provide the read-only dish/recipe lookup used by the engine.
//! - Resolve one dish to its ingredient lines for ONE serving, ignoring
//!   composition.
//!
//! # Invariants
//! - Composite dishes resolve to no base lines.
//! - Returned quantities are validated (finite, non-negative).

use super::error::{PlanError, PlanResult};
use crate::model::dish::{Dish, DishId, DishSource, RecipeId};
use crate::model::ingredient::IngredientLine;
use crate::model::recipe::Recipe;
use std::collections::HashMap;

/// Read-only lookup of dishes and recipes by id.
pub trait DishCatalog {
    fn dish(&self, id: &str) -> Option<&Dish>;
    fn recipe(&self, id: &str) -> Option<&Recipe>;
}

/// In-memory catalog loaded once before a planning run.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    dishes: HashMap<DishId, Dish>,
    recipes: HashMap<RecipeId, Recipe>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_dish(&mut self, dish: Dish) {
        self.dishes.insert(dish.id.clone(), dish);
    }

    pub fn insert_recipe(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.id.clone(), recipe);
    }

    pub fn with_dish(mut self, dish: Dish) -> Self {
        self.insert_dish(dish);
        self
    }

    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.insert_recipe(recipe);
        self
    }

    pub fn contains_recipe(&self, id: &str) -> bool {
        self.recipes.contains_key(id)
    }
}

impl DishCatalog for CatalogSnapshot {
    fn dish(&self, id: &str) -> Option<&Dish> {
        self.dishes.get(id)
    }

    fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }
}

/// Returns the ingredient lines of `dish` for one serving.
///
/// # Errors
/// - `RecipeNotFound` when a recipe-linked dish points to a missing recipe.
/// - `InvalidQuantity` for zero servings or negative/NaN line quantities.
pub fn resolve_base<C: DishCatalog + ?Sized>(
    catalog: &C,
    dish: &Dish,
) -> PlanResult<Vec<IngredientLine>> {
    match &dish.source {
        DishSource::RecipeLinked { recipe_id } => {
            let recipe = catalog
                .recipe(recipe_id)
                .ok_or_else(|| PlanError::RecipeNotFound {
                    recipe_id: recipe_id.clone(),
                    dish_id: dish.id.clone(),
                })?;
            per_serving(&recipe.ingredients, recipe.servings, &recipe.id)
        }
        DishSource::Standalone { ingredients } => {
            per_serving(ingredients, dish.servings, &dish.id)
        }
        DishSource::Composite { .. } => Ok(Vec::new()),
    }
}

fn per_serving(
    lines: &[IngredientLine],
    servings: u32,
    owner: &str,
) -> PlanResult<Vec<IngredientLine>> {
    if servings == 0 {
        return Err(PlanError::InvalidQuantity(format!(
            "`{owner}` declares zero servings"
        )));
    }
    let divisor = f64::from(servings);
    lines
        .iter()
        .map(|line| -> PlanResult<IngredientLine> {
            line.validate()?;
            Ok(IngredientLine {
                quantity: line.quantity / divisor,
                ..line.clone()
            })
        })
        .collect()
}
