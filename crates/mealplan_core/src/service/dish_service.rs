//! Dish and recipe use-case service.
//!
//! # Responsibility
//! - Validate dishes above the repository layer.
//! - Keep the stored composition graph acyclic.
//!
//! # Invariants
//! - Every component of a saved composite refers to a stored dish.
//! - Saving a composite never closes a cycle through the saved dish.
//! - A dish still referenced by composites or menu slots is not deleted.

use crate::engine::error::{PlanError, PlanResult};
use crate::model::dish::{Dish, DishId};
use crate::model::recipe::Recipe;
use crate::repo::dish_repo::DishRepository;
use crate::repo::menu_repo::MenuRepository;
use log::{info, warn};
use std::collections::HashSet;

/// Dish management facade.
pub struct DishService<R: DishRepository> {
    repo: R,
}

impl<R: DishRepository> DishService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Saves a recipe after validation.
    pub fn save_recipe(&self, recipe: &Recipe) -> PlanResult<()> {
        recipe.validate()?;
        self.repo.save_recipe(recipe)?;
        Ok(())
    }

    /// Creates or replaces a dish.
    ///
    /// # Errors
    /// - `Validation` / `InvalidQuantity` for record-level problems.
    /// - `DishNotFound` when a component refers to an unknown dish.
    /// - `CompositionCycle` when the save would make the graph cyclic.
    pub fn save_dish(&self, dish: &Dish) -> PlanResult<()> {
        dish.validate_for_save()?;

        for component in dish.components_in_order() {
            if self.repo.get_dish(&component.contained_dish_id)?.is_none() {
                return Err(PlanError::DishNotFound(component.contained_dish_id.clone()));
            }
        }
        if let Some(path) = self.find_cycle_through(dish)? {
            warn!(
                "event=dish_save module=service status=error error_code=composition_cycle path_len={}",
                path.len()
            );
            return Err(PlanError::CompositionCycle(path));
        }

        self.repo.save_dish(dish)?;
        info!(
            "event=dish_save module=service status=ok composite={}",
            dish.is_composite()
        );
        Ok(())
    }

    pub fn get_dish(&self, dish_id: &str) -> PlanResult<Dish> {
        self.repo
            .get_dish(dish_id)?
            .ok_or_else(|| PlanError::DishNotFound(dish_id.to_string()))
    }

    pub fn list_dishes(&self) -> PlanResult<Vec<Dish>> {
        Ok(self.repo.list_dishes()?)
    }

    /// Deletes a dish nobody references anymore.
    pub fn delete_dish(&self, dish_id: &str, menu: &impl MenuRepository) -> PlanResult<()> {
        let parent_ids = self.repo.list_parent_dish_ids(dish_id)?;
        let assignment_count = menu.count_assignments_for_dish(dish_id)?;
        if !parent_ids.is_empty() || assignment_count > 0 {
            return Err(PlanError::DishInUse {
                dish_id: dish_id.to_string(),
                parent_ids,
                assignment_count,
            });
        }
        self.repo.delete_dish(dish_id)?;
        Ok(())
    }

    /// Returns a path `dish -> ... -> dish` when one of `dish`'s components
    /// already reaches `dish` in the stored graph.
    fn find_cycle_through(&self, dish: &Dish) -> PlanResult<Option<Vec<DishId>>> {
        let mut path = vec![dish.id.clone()];
        let mut explored = HashSet::new();
        for component in dish.components_in_order() {
            if let Some(cycle) =
                self.walk(&component.contained_dish_id, &dish.id, &mut path, &mut explored)?
            {
                return Ok(Some(cycle));
            }
        }
        Ok(None)
    }

    fn walk(
        &self,
        current: &str,
        target: &str,
        path: &mut Vec<DishId>,
        explored: &mut HashSet<DishId>,
    ) -> PlanResult<Option<Vec<DishId>>> {
        if current == target {
            let mut cycle = path.clone();
            cycle.push(current.to_string());
            return Ok(Some(cycle));
        }
        if !explored.insert(current.to_string()) {
            return Ok(None);
        }

        let stored = self
            .repo
            .get_dish(current)?
            .ok_or_else(|| PlanError::DishNotFound(current.to_string()))?;
        path.push(current.to_string());
        for component in stored.components_in_order() {
            if let Some(cycle) = self.walk(&component.contained_dish_id, target, path, explored)? {
                return Ok(Some(cycle));
            }
        }
        path.pop();
        Ok(None)
    }
}
