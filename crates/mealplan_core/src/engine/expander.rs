//! Recursive dish composition expansion.
//!
//! # Responsibility
//! - Flatten a dish into leaf ingredient lines scaled to a serving count.
//!
//! # Invariants
//! - Base lines scale proportionally with `servings_requested`.
//! - Component multipliers are fixed headcounts: a component is expanded
//!   with `servings_requested = component.quantity`, whatever the parent
//!   was asked for.
//! - Cycle detection is ancestor-only. A dish may appear in several sibling
//!   branches; it may not appear twice on the current path.
//! - Results are unmerged and in traversal order (base first, then
//!   components by ascending `order`).

use super::catalog::{resolve_base, DishCatalog};
use super::error::{PlanError, PlanResult};
use crate::model::dish::{Dish, DishId};
use crate::model::ingredient::IngredientLine;
use crate::model::validation::ensure_valid_quantity;
use log::warn;

/// Expands dishes from a catalog into ingredient lines.
pub struct DishExpander<'a, C: DishCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: DishCatalog + ?Sized> DishExpander<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a C {
        self.catalog
    }

    /// Expands `dish_id` for `servings_requested` servings from an empty path.
    ///
    /// # Errors
    /// - `DishNotFound` for any missing dish on the way.
    /// - `CompositionCycle` when a dish is reached again from itself.
    /// - `RecipeNotFound` / `InvalidQuantity` from base resolution.
    pub fn expand(&self, dish_id: &str, servings_requested: f64) -> PlanResult<Vec<IngredientLine>> {
        let mut visiting = Vec::new();
        self.expand_visiting(dish_id, servings_requested, &mut visiting)
    }

    /// Expands with an explicit ancestor path.
    ///
    /// `visiting` is restored to its input state before returning, on both
    /// success and failure.
    pub fn expand_visiting(
        &self,
        dish_id: &str,
        servings_requested: f64,
        visiting: &mut Vec<DishId>,
    ) -> PlanResult<Vec<IngredientLine>> {
        ensure_valid_quantity(servings_requested, format!("servings requested for `{dish_id}`"))?;

        let dish = self
            .catalog
            .dish(dish_id)
            .ok_or_else(|| PlanError::DishNotFound(dish_id.to_string()))?;

        if let Some(position) = visiting.iter().position(|id| id == dish_id) {
            let mut path = visiting[position..].to_vec();
            path.push(dish_id.to_string());
            warn!(
                "event=dish_expand module=engine status=error error_code=composition_cycle path_len={}",
                path.len()
            );
            return Err(PlanError::CompositionCycle(path));
        }

        visiting.push(dish.id.clone());
        let expanded = self.expand_dish(dish, servings_requested, visiting);
        visiting.pop();
        expanded
    }

    fn expand_dish(
        &self,
        dish: &Dish,
        servings_requested: f64,
        visiting: &mut Vec<DishId>,
    ) -> PlanResult<Vec<IngredientLine>> {
        let mut lines = resolve_base(self.catalog, dish)?
            .into_iter()
            .map(|line| line.scaled(servings_requested))
            .collect::<Vec<_>>();

        for component in dish.components_in_order() {
            let contributed = self.expand_visiting(
                &component.contained_dish_id,
                f64::from(component.quantity),
                visiting,
            )?;
            lines.extend(contributed);
        }

        Ok(lines)
    }
}
