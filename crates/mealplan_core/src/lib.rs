//! Meal-planning core: dish expansion, menu ranges and shopping lists.
//! Business invariants live here; front-ends only parse input and render.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::PlannerConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::aggregator::ShoppingListAggregator;
pub use engine::catalog::{CatalogSnapshot, DishCatalog};
pub use engine::category::{CategoryDictionary, DEFAULT_CATEGORY};
pub use engine::error::{PlanError, PlanResult};
pub use engine::expander::DishExpander;
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::dish::{Dish, DishComponent, DishId, DishSource, RecipeId};
pub use model::ingredient::{IngredientKey, IngredientLine};
pub use model::menu::{DateRange, MealType, MenuAssignment};
pub use model::recipe::Recipe;
pub use model::shopping::{MealSource, ShoppingList, ShoppingListId, ShoppingListItem};
pub use model::validation::ModelValidationError;
pub use repo::store::{PlannerStore, SqlitePlannerStore};
pub use repo::{RepoError, RepoResult};
pub use service::dish_service::DishService;
pub use service::menu_service::MenuService;
pub use service::shopping_service::ShoppingService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
