//! Dish domain model.
//!
//! # Responsibility
//! - Describe a schedulable meal unit and where its ingredients come from.
//!
//! # Invariants
//! - Exactly one source is active per dish; the enum enforces it.
//! - `servings >= 1`; component `quantity >= 1`.
//! - Component `order` values are unique within one composite.
//! - Acyclicity of the composition graph is a cross-record invariant and is
//!   checked by the engine and dish service, not here.

use super::ingredient::IngredientLine;
use super::validation::{
    ensure_id_not_blank, ensure_not_blank, ensure_positive_count, ModelValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque dish identifier.
pub type DishId = String;

/// Opaque recipe identifier.
pub type RecipeId = String;

/// Where a dish takes its ingredients from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DishSource {
    /// Ingredients come from a stored recipe.
    RecipeLinked { recipe_id: RecipeId },
    /// Ingredients are recorded on the dish, for `Dish::servings` servings.
    Standalone { ingredients: Vec<IngredientLine> },
    /// Content is made only of other dishes.
    Composite { components: Vec<DishComponent> },
}

/// Membership of one dish inside a composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishComponent {
    pub contained_dish_id: DishId,
    /// Fixed headcount of the contained dish, not scaled by parent servings.
    pub quantity: u32,
    pub order: i64,
}

impl DishComponent {
    pub fn new(contained_dish_id: impl Into<DishId>, quantity: u32, order: i64) -> Self {
        Self {
            contained_dish_id: contained_dish_id.into(),
            quantity,
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub servings: u32,
    pub source: DishSource,
}

impl Dish {
    pub fn standalone(
        id: impl Into<DishId>,
        name: impl Into<String>,
        servings: u32,
        ingredients: Vec<IngredientLine>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            servings,
            source: DishSource::Standalone { ingredients },
        }
    }

    pub fn recipe_linked(
        id: impl Into<DishId>,
        name: impl Into<String>,
        servings: u32,
        recipe_id: impl Into<RecipeId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            servings,
            source: DishSource::RecipeLinked {
                recipe_id: recipe_id.into(),
            },
        }
    }

    pub fn composite(
        id: impl Into<DishId>,
        name: impl Into<String>,
        components: Vec<DishComponent>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            servings: 1,
            source: DishSource::Composite { components },
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.source, DishSource::Composite { .. })
    }

    /// Components sorted by ascending `order`; empty for non-composite dishes.
    pub fn components_in_order(&self) -> Vec<&DishComponent> {
        match &self.source {
            DishSource::Composite { components } => {
                let mut ordered = components.iter().collect::<Vec<_>>();
                ordered.sort_by_key(|component| component.order);
                ordered
            }
            _ => Vec::new(),
        }
    }

    /// Checks record-local invariants.
    ///
    /// # Errors
    /// - Blank id/name, zero servings, invalid ingredient quantities.
    /// - Zero component quantity, duplicate component order.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id_not_blank(&self.id, "dish id")?;
        ensure_not_blank(&self.name, "dish name")?;
        ensure_positive_count(self.servings, "dish servings")?;

        match &self.source {
            DishSource::RecipeLinked { recipe_id } => {
                ensure_id_not_blank(recipe_id, "recipe id")?;
            }
            DishSource::Standalone { ingredients } => {
                for line in ingredients {
                    line.validate()?;
                }
            }
            DishSource::Composite { components } => {
                let mut seen_orders = HashSet::new();
                for component in components {
                    ensure_id_not_blank(&component.contained_dish_id, "component dish id")?;
                    ensure_positive_count(component.quantity, "component quantity")?;
                    if !seen_orders.insert(component.order) {
                        return Err(ModelValidationError::DuplicateComponentOrder {
                            dish_id: self.id.clone(),
                            order: component.order,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// [`Dish::validate`] plus the checks only enforced when writing.
    ///
    /// Stored self-containing composites still load, so planning can report
    /// them as a composition cycle.
    pub fn validate_for_save(&self) -> Result<(), ModelValidationError> {
        self.validate()?;
        let contains_itself = self
            .components_in_order()
            .iter()
            .any(|component| component.contained_dish_id == self.id);
        if contains_itself {
            return Err(ModelValidationError::SelfReference(self.id.clone()));
        }
        Ok(())
    }
}
