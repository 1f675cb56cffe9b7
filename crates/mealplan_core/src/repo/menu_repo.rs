//! Menu assignment repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing is ordered by `date ASC`, then recording order
//!   (`assignment_id ASC`).
//! - Range filters are inclusive on both ends.

use super::{count_to_u32, date_to_db, ensure_connection_ready, parse_date, RepoError, RepoResult};
use crate::model::menu::{DateRange, MealType, MenuAssignment};
use rusqlite::{params, Connection, Row};

/// Row id of a stored menu assignment.
pub type AssignmentId = i64;

/// Stored assignment with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAssignment {
    pub assignment_id: AssignmentId,
    pub assignment: MenuAssignment,
}

/// Repository interface for menu assignments.
pub trait MenuRepository {
    /// Records one assignment and returns its id.
    fn add_assignment(&self, assignment: &MenuAssignment) -> RepoResult<AssignmentId>;
    /// Removes one assignment by id.
    fn remove_assignment(&self, assignment_id: AssignmentId) -> RepoResult<()>;
    /// Lists assignments whose date falls in `range`.
    fn list_assignments(&self, range: &DateRange) -> RepoResult<Vec<StoredAssignment>>;
    /// Counts assignments referencing `dish_id`, across all dates.
    fn count_assignments_for_dish(&self, dish_id: &str) -> RepoResult<u64>;
    /// Returns whether a dish with `dish_id` is stored.
    fn dish_exists(&self, dish_id: &str) -> RepoResult<bool>;
}

/// SQLite-backed menu repository.
pub struct SqliteMenuRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMenuRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["menu_assignments", "dishes"])?;
        Ok(Self { conn })
    }
}

impl MenuRepository for SqliteMenuRepository<'_> {
    fn add_assignment(&self, assignment: &MenuAssignment) -> RepoResult<AssignmentId> {
        assignment.validate()?;
        self.conn.execute(
            "INSERT INTO menu_assignments (date, meal_type, dish_id, portions)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                date_to_db(assignment.date),
                assignment.meal_type.as_str(),
                assignment.dish_id.as_str(),
                i64::from(assignment.portions),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn remove_assignment(&self, assignment_id: AssignmentId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM menu_assignments WHERE assignment_id = ?1;",
            [assignment_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "menu assignment",
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }

    fn list_assignments(&self, range: &DateRange) -> RepoResult<Vec<StoredAssignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT assignment_id, date, meal_type, dish_id, portions
             FROM menu_assignments
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date ASC, assignment_id ASC;",
        )?;
        let mut rows = stmt.query(params![date_to_db(range.start()), date_to_db(range.end())])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_assignment_row(row)?);
        }
        Ok(items)
    }

    fn count_assignments_for_dish(&self, dish_id: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM menu_assignments WHERE dish_id = ?1;",
            [dish_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn dish_exists(&self, dish_id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM dishes WHERE dish_id = ?1);",
            [dish_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<StoredAssignment> {
    let date_text: String = row.get("date")?;
    let meal_text: String = row.get("meal_type")?;
    let meal_type = MealType::parse(&meal_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid meal type `{meal_text}` in menu_assignments.meal_type"
        ))
    })?;

    let assignment = MenuAssignment {
        date: parse_date(&date_text, "menu_assignments.date")?,
        meal_type,
        dish_id: row.get("dish_id")?,
        portions: count_to_u32(row.get("portions")?, "menu_assignments.portions")?,
    };
    assignment.validate().map_err(|err| {
        RepoError::InvalidData(format!("menu assignment: {err}"))
    })?;

    Ok(StoredAssignment {
        assignment_id: row.get("assignment_id")?,
        assignment,
    })
}
