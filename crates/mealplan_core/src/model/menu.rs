//! Menu assignments and date ranges.
//!
//! # Invariants
//! - `portions >= 1`.
//! - `DateRange` is inclusive on both ends and never inverted; deserializing
//!   an inverted range fails.

use super::dish::DishId;
use super::validation::{ensure_id_not_blank, ensure_positive_count, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Meal slot of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" => Some(Self::Snack),
            _ => None,
        }
    }
}

impl Display for MealType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dish scheduled on one meal slot.
///
/// Several assignments may share the same `(date, meal_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAssignment {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub dish_id: DishId,
    pub portions: u32,
}

impl MenuAssignment {
    pub fn new(date: NaiveDate, meal_type: MealType, dish_id: impl Into<DishId>, portions: u32) -> Self {
        Self {
            date,
            meal_type,
            dish_id: dish_id.into(),
            portions,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id_not_blank(&self.dish_id, "assignment dish id")?;
        ensure_positive_count(self.portions, "assignment portions")
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ModelValidationError;

    fn try_from(value: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ModelValidationError> {
        if end < start {
            return Err(ModelValidationError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
