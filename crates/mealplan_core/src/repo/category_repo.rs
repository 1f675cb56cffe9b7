//! Category dictionary repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Keys are normalized ingredient names; writes normalize before storing.
//! - Loading returns a snapshot; later edits do not affect it.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::engine::category::CategoryDictionary;
use crate::model::ingredient::normalize_name;
use crate::model::validation::ModelValidationError;
use rusqlite::{params, Connection};

/// Repository interface for the user-editable category dictionary.
pub trait CategoryRepository {
    /// Loads all entries as a snapshot with the given default category.
    fn load_dictionary(&self, default_category: &str) -> RepoResult<CategoryDictionary>;
    /// Inserts or replaces one entry.
    fn set_category(&self, ingredient: &str, category: &str) -> RepoResult<()>;
    /// Removes one entry.
    fn remove_category(&self, ingredient: &str) -> RepoResult<()>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["category_entries"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn load_dictionary(&self, default_category: &str) -> RepoResult<CategoryDictionary> {
        let mut stmt = self.conn.prepare(
            "SELECT ingredient_key, category
             FROM category_entries
             ORDER BY ingredient_key ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
        }
        Ok(CategoryDictionary::from_entries(entries, default_category))
    }

    fn set_category(&self, ingredient: &str, category: &str) -> RepoResult<()> {
        let key = normalize_name(ingredient);
        if key.is_empty() {
            return Err(ModelValidationError::BlankName("ingredient name").into());
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ModelValidationError::BlankName("category").into());
        }

        self.conn.execute(
            "INSERT INTO category_entries (ingredient_key, category)
             VALUES (?1, ?2)
             ON CONFLICT(ingredient_key) DO UPDATE SET
                category = excluded.category,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, category],
        )?;
        Ok(())
    }

    fn remove_category(&self, ingredient: &str) -> RepoResult<()> {
        let key = normalize_name(ingredient);
        let changed = self.conn.execute(
            "DELETE FROM category_entries WHERE ingredient_key = ?1;",
            [key.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category entry",
                id: key,
            });
        }
        Ok(())
    }
}
