//! Menu scheduling use-case service.
//!
//! # Invariants
//! - Assignments reference stored dishes and have `portions >= 1`.
//! - Several dishes per `(date, meal_type)` are allowed.

use crate::engine::error::{PlanError, PlanResult};
use crate::model::menu::{DateRange, MealType, MenuAssignment};
use crate::repo::menu_repo::{AssignmentId, MenuRepository, StoredAssignment};
use chrono::NaiveDate;

pub struct MenuService<R: MenuRepository> {
    repo: R,
}

impl<R: MenuRepository> MenuService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Schedules `dish_id` on one meal slot.
    pub fn add_assignment(
        &self,
        date: NaiveDate,
        meal_type: MealType,
        dish_id: &str,
        portions: u32,
    ) -> PlanResult<AssignmentId> {
        let assignment = MenuAssignment::new(date, meal_type, dish_id.trim(), portions);
        assignment.validate()?;
        if !self.repo.dish_exists(&assignment.dish_id)? {
            return Err(PlanError::DishNotFound(assignment.dish_id));
        }
        Ok(self.repo.add_assignment(&assignment)?)
    }

    pub fn remove_assignment(&self, assignment_id: AssignmentId) -> PlanResult<()> {
        self.repo.remove_assignment(assignment_id)?;
        Ok(())
    }

    pub fn list_range(&self, range: &DateRange) -> PlanResult<Vec<StoredAssignment>> {
        Ok(self.repo.list_assignments(range)?)
    }

    pub fn list_day(&self, date: NaiveDate) -> PlanResult<Vec<StoredAssignment>> {
        self.list_range(&DateRange::single_day(date))
    }
}
