//! Dish and recipe repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A dish row and its component rows are written in one savepoint.
//! - `source_kind` decides which of `recipe_id` / `ingredients_json` /
//!   component rows is meaningful; the table CHECK mirrors `DishSource`.
//! - Component rows are returned by ascending `sort_order`.

use super::{
    count_to_u32, ensure_connection_ready, from_json, in_savepoint, to_json, RepoError, RepoResult,
};
use crate::model::dish::{Dish, DishComponent, DishSource};
use crate::model::ingredient::IngredientLine;
use crate::model::recipe::Recipe;
use rusqlite::{params, Connection, OptionalExtension, Row};

const DISH_SELECT_SQL: &str = "SELECT
    dish_id,
    name,
    servings,
    source_kind,
    recipe_id,
    ingredients_json
FROM dishes";

/// Repository interface for dishes and the recipes they link to.
pub trait DishRepository {
    /// Inserts or replaces one dish including its components.
    fn save_dish(&self, dish: &Dish) -> RepoResult<()>;
    /// Loads one dish by id.
    fn get_dish(&self, dish_id: &str) -> RepoResult<Option<Dish>>;
    /// Lists all dishes ordered by name.
    fn list_dishes(&self) -> RepoResult<Vec<Dish>>;
    /// Deletes one dish and its component rows.
    fn delete_dish(&self, dish_id: &str) -> RepoResult<()>;
    /// Ids of composites that directly contain `dish_id`.
    fn list_parent_dish_ids(&self, dish_id: &str) -> RepoResult<Vec<String>>;
    /// Inserts or replaces one recipe.
    fn save_recipe(&self, recipe: &Recipe) -> RepoResult<()>;
    /// Loads one recipe by id.
    fn get_recipe(&self, recipe_id: &str) -> RepoResult<Option<Recipe>>;
}

/// SQLite-backed dish repository.
pub struct SqliteDishRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDishRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["dishes", "dish_components", "recipes"])?;
        Ok(Self { conn })
    }
}

impl DishRepository for SqliteDishRepository<'_> {
    fn save_dish(&self, dish: &Dish) -> RepoResult<()> {
        dish.validate_for_save()?;

        let (source_kind, recipe_id, ingredients_json) = match &dish.source {
            DishSource::RecipeLinked { recipe_id } => ("recipe_linked", Some(recipe_id.clone()), None),
            DishSource::Standalone { ingredients } => (
                "standalone",
                None,
                Some(to_json(ingredients, "dishes.ingredients_json")?),
            ),
            DishSource::Composite { .. } => ("composite", None, None),
        };

        in_savepoint(self.conn, "save_dish", || {
            self.conn.execute(
                "INSERT INTO dishes (
                    dish_id,
                    name,
                    servings,
                    source_kind,
                    recipe_id,
                    ingredients_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(dish_id) DO UPDATE SET
                    name = excluded.name,
                    servings = excluded.servings,
                    source_kind = excluded.source_kind,
                    recipe_id = excluded.recipe_id,
                    ingredients_json = excluded.ingredients_json,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    dish.id.as_str(),
                    dish.name.trim(),
                    i64::from(dish.servings),
                    source_kind,
                    recipe_id,
                    ingredients_json,
                ],
            )?;

            self.conn.execute(
                "DELETE FROM dish_components WHERE dish_id = ?1;",
                [dish.id.as_str()],
            )?;
            for component in dish.components_in_order() {
                self.conn.execute(
                    "INSERT INTO dish_components (
                        dish_id,
                        contained_dish_id,
                        quantity,
                        sort_order
                    ) VALUES (?1, ?2, ?3, ?4);",
                    params![
                        dish.id.as_str(),
                        component.contained_dish_id.as_str(),
                        i64::from(component.quantity),
                        component.order,
                    ],
                )?;
            }

            Ok(())
        })
    }

    fn get_dish(&self, dish_id: &str) -> RepoResult<Option<Dish>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DISH_SELECT_SQL} WHERE dish_id = ?1;"))?;
        let mut rows = stmt.query([dish_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_dish_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_dishes(&self) -> RepoResult<Vec<Dish>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DISH_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, dish_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut dishes = Vec::new();
        while let Some(row) = rows.next()? {
            dishes.push(parse_dish_row(self.conn, row)?);
        }
        Ok(dishes)
    }

    fn delete_dish(&self, dish_id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM dishes WHERE dish_id = ?1;", [dish_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "dish",
                id: dish_id.to_string(),
            });
        }
        Ok(())
    }

    fn list_parent_dish_ids(&self, dish_id: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT dish_id
             FROM dish_components
             WHERE contained_dish_id = ?1
             ORDER BY dish_id ASC;",
        )?;
        let mut rows = stmt.query([dish_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn save_recipe(&self, recipe: &Recipe) -> RepoResult<()> {
        recipe.validate()?;
        self.conn.execute(
            "INSERT INTO recipes (recipe_id, name, servings, ingredients_json)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(recipe_id) DO UPDATE SET
                name = excluded.name,
                servings = excluded.servings,
                ingredients_json = excluded.ingredients_json,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                recipe.id.as_str(),
                recipe.name.trim(),
                i64::from(recipe.servings),
                to_json(&recipe.ingredients, "recipes.ingredients_json")?,
            ],
        )?;
        Ok(())
    }

    fn get_recipe(&self, recipe_id: &str) -> RepoResult<Option<Recipe>> {
        let row = self
            .conn
            .query_row(
                "SELECT recipe_id, name, servings, ingredients_json
                 FROM recipes
                 WHERE recipe_id = ?1;",
                [recipe_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, servings, ingredients_json)) = row else {
            return Ok(None);
        };
        let recipe = Recipe {
            id,
            name,
            servings: count_to_u32(servings, "recipes.servings")?,
            ingredients: from_json(&ingredients_json, "recipes.ingredients_json")?,
        };
        recipe
            .validate()
            .map_err(|err| RepoError::InvalidData(format!("recipe `{}`: {err}", recipe.id)))?;
        Ok(Some(recipe))
    }
}

fn parse_dish_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Dish> {
    let id: String = row.get("dish_id")?;
    let source_kind: String = row.get("source_kind")?;

    let source = match source_kind.as_str() {
        "recipe_linked" => {
            let recipe_id: Option<String> = row.get("recipe_id")?;
            DishSource::RecipeLinked {
                recipe_id: recipe_id.ok_or_else(|| {
                    RepoError::InvalidData(format!("dish `{id}` has no recipe_id"))
                })?,
            }
        }
        "standalone" => {
            let raw: Option<String> = row.get("ingredients_json")?;
            let raw = raw.ok_or_else(|| {
                RepoError::InvalidData(format!("dish `{id}` has no ingredients_json"))
            })?;
            let ingredients: Vec<IngredientLine> = from_json(&raw, "dishes.ingredients_json")?;
            DishSource::Standalone { ingredients }
        }
        "composite" => DishSource::Composite {
            components: load_components(conn, &id)?,
        },
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid source kind `{other}` in dishes.source_kind"
            )));
        }
    };

    let dish = Dish {
        name: row.get("name")?,
        servings: count_to_u32(row.get("servings")?, "dishes.servings")?,
        source,
        id,
    };
    dish.validate()
        .map_err(|err| RepoError::InvalidData(format!("dish `{}`: {err}", dish.id)))?;
    Ok(dish)
}

fn load_components(conn: &Connection, dish_id: &str) -> RepoResult<Vec<DishComponent>> {
    let mut stmt = conn.prepare(
        "SELECT contained_dish_id, quantity, sort_order
         FROM dish_components
         WHERE dish_id = ?1
         ORDER BY sort_order ASC;",
    )?;
    let mut rows = stmt.query([dish_id])?;
    let mut components = Vec::new();
    while let Some(row) = rows.next()? {
        components.push(DishComponent {
            contained_dish_id: row.get(0)?,
            quantity: count_to_u32(row.get(1)?, "dish_components.quantity")?,
            order: row.get(2)?,
        });
    }
    Ok(components)
}
