//! Planner store: the read/write contract consumed by shopping use-cases.
//!
//! # Responsibility
//! - Expose the narrow persistence surface the planning core depends on.
//! - Compose the SQLite repositories over one connection.
//!
//! # Invariants
//! - Missing records are `Ok(None)`, never errors.
//! - Storage failures surface as `RepoError`, unchanged.

use super::category_repo::{CategoryRepository, SqliteCategoryRepository};
use super::dish_repo::{DishRepository, SqliteDishRepository};
use super::menu_repo::{MenuRepository, SqliteMenuRepository};
use super::shopping_repo::{ShoppingListRepository, SqliteShoppingListRepository};
use super::RepoResult;
use crate::engine::category::CategoryDictionary;
use crate::model::dish::Dish;
use crate::model::menu::{DateRange, MenuAssignment};
use crate::model::recipe::Recipe;
use crate::model::shopping::{ShoppingList, ShoppingListId};
use rusqlite::Connection;

/// Persistence operations required by the shopping-list core.
pub trait PlannerStore {
    fn load_dish(&self, dish_id: &str) -> RepoResult<Option<Dish>>;
    fn load_recipe_ingredients(&self, recipe_id: &str) -> RepoResult<Option<Recipe>>;
    /// Assignments in `range`, by date then recording order.
    fn load_menu_assignments(&self, range: &DateRange) -> RepoResult<Vec<MenuAssignment>>;
    fn load_category_dictionary(&self, default_category: &str) -> RepoResult<CategoryDictionary>;
    fn load_shopping_list(&self, list_id: ShoppingListId) -> RepoResult<Option<ShoppingList>>;
    fn save_shopping_list(&self, list: &ShoppingList) -> RepoResult<()>;
}

/// SQLite-backed planner store.
pub struct SqlitePlannerStore<'conn> {
    dishes: SqliteDishRepository<'conn>,
    menu: SqliteMenuRepository<'conn>,
    categories: SqliteCategoryRepository<'conn>,
    lists: SqliteShoppingListRepository<'conn>,
}

impl<'conn> SqlitePlannerStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            dishes: SqliteDishRepository::try_new(conn)?,
            menu: SqliteMenuRepository::try_new(conn)?,
            categories: SqliteCategoryRepository::try_new(conn)?,
            lists: SqliteShoppingListRepository::try_new(conn)?,
        })
    }

    pub fn dishes(&self) -> &SqliteDishRepository<'conn> {
        &self.dishes
    }

    pub fn menu(&self) -> &SqliteMenuRepository<'conn> {
        &self.menu
    }

    pub fn categories(&self) -> &SqliteCategoryRepository<'conn> {
        &self.categories
    }

    pub fn lists(&self) -> &SqliteShoppingListRepository<'conn> {
        &self.lists
    }
}

impl PlannerStore for SqlitePlannerStore<'_> {
    fn load_dish(&self, dish_id: &str) -> RepoResult<Option<Dish>> {
        self.dishes.get_dish(dish_id)
    }

    fn load_recipe_ingredients(&self, recipe_id: &str) -> RepoResult<Option<Recipe>> {
        self.dishes.get_recipe(recipe_id)
    }

    fn load_menu_assignments(&self, range: &DateRange) -> RepoResult<Vec<MenuAssignment>> {
        Ok(self
            .menu
            .list_assignments(range)?
            .into_iter()
            .map(|stored| stored.assignment)
            .collect())
    }

    fn load_category_dictionary(&self, default_category: &str) -> RepoResult<CategoryDictionary> {
        self.categories.load_dictionary(default_category)
    }

    fn load_shopping_list(&self, list_id: ShoppingListId) -> RepoResult<Option<ShoppingList>> {
        self.lists.get_shopping_list(list_id)
    }

    fn save_shopping_list(&self, list: &ShoppingList) -> RepoResult<()> {
        self.lists.save_shopping_list(list)
    }
}
