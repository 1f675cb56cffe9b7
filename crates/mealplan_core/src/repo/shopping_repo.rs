//! Shopping list repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Saving replaces the list row and all of its items in one savepoint.
//! - Item order is persisted via `position` and restored on load.
//! - `(list_id, ingredient_key, unit)` is unique.

use super::{
    bool_to_int, date_to_db, ensure_connection_ready, from_json, in_savepoint, parse_bool,
    parse_date, to_json, RepoError, RepoResult,
};
use crate::model::shopping::{MealSource, ShoppingList, ShoppingListId, ShoppingListItem};
use crate::model::validation::ModelValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Header of a stored list, without items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListSummary {
    pub id: ShoppingListId,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub item_count: u64,
}

/// Repository interface for shopping lists.
pub trait ShoppingListRepository {
    /// Inserts or fully replaces one list.
    fn save_shopping_list(&self, list: &ShoppingList) -> RepoResult<()>;
    /// Loads one list with its items.
    fn get_shopping_list(&self, list_id: ShoppingListId) -> RepoResult<Option<ShoppingList>>;
    /// Lists stored lists, newest first.
    fn list_shopping_lists(&self) -> RepoResult<Vec<ShoppingListSummary>>;
    /// Deletes one list and its items.
    fn delete_shopping_list(&self, list_id: ShoppingListId) -> RepoResult<()>;
}

/// SQLite-backed shopping list repository.
pub struct SqliteShoppingListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShoppingListRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["shopping_lists", "shopping_list_items"])?;
        Ok(Self { conn })
    }
}

impl ShoppingListRepository for SqliteShoppingListRepository<'_> {
    fn save_shopping_list(&self, list: &ShoppingList) -> RepoResult<()> {
        if list.end_date < list.start_date {
            return Err(ModelValidationError::InvertedDateRange {
                start: list.start_date.to_string(),
                end: list.end_date.to_string(),
            }
            .into());
        }

        let list_id = list.id.to_string();
        in_savepoint(self.conn, "save_shopping_list", || {
            self.conn.execute(
                "INSERT INTO shopping_lists (list_id, start_date, end_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(list_id) DO UPDATE SET
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    updated_at = excluded.updated_at;",
                params![
                    list_id.as_str(),
                    date_to_db(list.start_date),
                    date_to_db(list.end_date),
                    list.created_at,
                    list.updated_at,
                ],
            )?;

            self.conn.execute(
                "DELETE FROM shopping_list_items WHERE list_id = ?1;",
                [list_id.as_str()],
            )?;
            for (position, item) in list.items.iter().enumerate() {
                let key = item.key();
                self.conn.execute(
                    "INSERT INTO shopping_list_items (
                        list_id,
                        position,
                        ingredient_name,
                        ingredient_key,
                        quantity,
                        unit,
                        category,
                        checked,
                        canceled,
                        sources_json
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                    params![
                        list_id.as_str(),
                        position as i64,
                        item.ingredient_name.as_str(),
                        key.name,
                        item.quantity,
                        key.unit,
                        item.category.as_str(),
                        bool_to_int(item.checked),
                        bool_to_int(item.canceled),
                        to_json(&item.sources, "shopping_list_items.sources_json")?,
                    ],
                )?;
            }

            Ok(())
        })
    }

    fn get_shopping_list(&self, list_id: ShoppingListId) -> RepoResult<Option<ShoppingList>> {
        let header = self
            .conn
            .query_row(
                "SELECT start_date, end_date, created_at, updated_at
                 FROM shopping_lists
                 WHERE list_id = ?1;",
                [list_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((start_text, end_text, created_at, updated_at)) = header else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT ingredient_name, quantity, unit, category, checked, canceled, sources_json
             FROM shopping_list_items
             WHERE list_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(Some(ShoppingList {
            id: list_id,
            start_date: parse_date(&start_text, "shopping_lists.start_date")?,
            end_date: parse_date(&end_text, "shopping_lists.end_date")?,
            created_at,
            updated_at,
            items,
        }))
    }

    fn list_shopping_lists(&self) -> RepoResult<Vec<ShoppingListSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                l.list_id,
                l.start_date,
                l.end_date,
                l.created_at,
                l.updated_at,
                (SELECT COUNT(*) FROM shopping_list_items i WHERE i.list_id = l.list_id)
             FROM shopping_lists l
             ORDER BY l.created_at DESC, l.list_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            let id = Uuid::parse_str(&id_text).map_err(|_| {
                RepoError::InvalidData(format!("invalid uuid `{id_text}` in shopping_lists.list_id"))
            })?;
            let start_text: String = row.get(1)?;
            let end_text: String = row.get(2)?;
            summaries.push(ShoppingListSummary {
                id,
                start_date: parse_date(&start_text, "shopping_lists.start_date")?,
                end_date: parse_date(&end_text, "shopping_lists.end_date")?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
                item_count: row.get::<_, i64>(5)?.max(0) as u64,
            });
        }
        Ok(summaries)
    }

    fn delete_shopping_list(&self, list_id: ShoppingListId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM shopping_lists WHERE list_id = ?1;",
            [list_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "shopping list",
                id: list_id.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ShoppingListItem> {
    let quantity: f64 = row.get("quantity")?;
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(RepoError::InvalidData(format!(
            "invalid quantity `{quantity}` in shopping_list_items.quantity"
        )));
    }
    let sources_json: String = row.get("sources_json")?;
    let sources: Vec<MealSource> = from_json(&sources_json, "shopping_list_items.sources_json")?;

    Ok(ShoppingListItem {
        ingredient_name: row.get("ingredient_name")?,
        quantity,
        unit: row.get("unit")?,
        category: row.get("category")?,
        checked: parse_bool(row.get("checked")?, "shopping_list_items.checked")?,
        canceled: parse_bool(row.get("canceled")?, "shopping_list_items.canceled")?,
        sources,
    })
}
