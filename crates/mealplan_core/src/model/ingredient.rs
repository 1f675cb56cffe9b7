//! Ingredient lines and their merge identity.
//!
//! # Invariants
//! - `quantity` is finite and non-negative once validated.
//! - Two lines merge only when their `IngredientKey`s are equal; a unit
//!   mismatch keeps them apart (no unit conversion).

use super::validation::{ensure_not_blank, ensure_valid_quantity, ModelValidationError};
use serde::{Deserialize, Serialize};

/// One `(name, quantity, unit)` entry of a recipe, dish or expansion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Normalized merge identity of an ingredient line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IngredientKey {
    /// Lower-cased, trimmed ingredient name.
    pub name: String,
    /// Unit with surrounding whitespace removed.
    pub unit: String,
}

impl IngredientKey {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            name: normalize_name(name),
            unit: unit.trim().to_string(),
        }
    }
}

impl IngredientLine {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn key(&self) -> IngredientKey {
        IngredientKey::new(&self.name, &self.unit)
    }

    /// Returns a copy with `quantity` multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            quantity: self.quantity * factor,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_not_blank(&self.name, "ingredient name")?;
        ensure_valid_quantity(self.quantity, format!("ingredient `{}`", self.name.trim()))
    }
}

/// Lower-cases and trims an ingredient name for identity comparisons.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
