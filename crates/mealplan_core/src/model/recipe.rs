//! Recipe records referenced by recipe-linked dishes.

use super::dish::RecipeId;
use super::ingredient::IngredientLine;
use super::validation::{
    ensure_id_not_blank, ensure_not_blank, ensure_positive_count, ModelValidationError,
};
use serde::{Deserialize, Serialize};

/// Stored recipe; `ingredients` are recorded for `servings` servings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<IngredientLine>,
}

impl Recipe {
    pub fn new(
        id: impl Into<RecipeId>,
        name: impl Into<String>,
        servings: u32,
        ingredients: Vec<IngredientLine>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            servings,
            ingredients,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id_not_blank(&self.id, "recipe id")?;
        ensure_not_blank(&self.name, "recipe name")?;
        ensure_positive_count(self.servings, "recipe servings")?;
        for line in &self.ingredients {
            line.validate()?;
        }
        Ok(())
    }
}
