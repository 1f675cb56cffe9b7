//! Meal-planning domain model.
//!
//! # Responsibility
//! - Define the records read by the planning engine (dishes, recipes, menu
//!   assignments) and the shopping lists it produces.
//! - Keep record-level validation next to the records themselves.
//!
//! # Invariants
//! - A dish carries exactly one `DishSource` variant.
//! - Quantities are finite and non-negative; servings and portions are >= 1.
//! - Ingredient identity for merging is `(normalize_name(name), unit)`.

pub mod dish;
pub mod ingredient;
pub mod menu;
pub mod recipe;
pub mod shopping;
pub mod validation;
