//! Planning error taxonomy.

use crate::model::dish::{DishId, RecipeId};
use crate::model::shopping::ShoppingListId;
use crate::model::validation::ModelValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PlanResult<T> = Result<T, PlanError>;

/// Terminal failure of an expansion, generation or planning use-case.
#[derive(Debug)]
pub enum PlanError {
    /// Referenced dish does not exist.
    DishNotFound(DishId),
    /// Recipe referenced by a recipe-linked dish does not exist.
    RecipeNotFound { recipe_id: RecipeId, dish_id: DishId },
    /// Composition graph loops; path starts and ends on the same dish.
    CompositionCycle(Vec<DishId>),
    /// Negative, NaN or zero-count quantity met during planning.
    InvalidQuantity(String),
    /// Record failed validation for a reason other than its quantities.
    Validation(ModelValidationError),
    /// Dish cannot be deleted while composites or menu slots still use it.
    DishInUse {
        dish_id: DishId,
        parent_ids: Vec<DishId>,
        assignment_count: u64,
    },
    /// Shopping list to regenerate or update does not exist.
    ShoppingListNotFound(ShoppingListId),
    /// Persistence adapter failure, passed through unchanged.
    Persistence(RepoError),
}

impl Display for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DishNotFound(id) => write!(f, "dish not found: {id}"),
            Self::RecipeNotFound { recipe_id, dish_id } => {
                write!(f, "recipe not found: {recipe_id} (linked from dish {dish_id})")
            }
            Self::CompositionCycle(path) => {
                write!(f, "dish composition cycle: {}", path.join(" -> "))
            }
            Self::InvalidQuantity(context) => write!(f, "invalid quantity: {context}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DishInUse {
                dish_id,
                parent_ids,
                assignment_count,
            } => write!(
                f,
                "dish {dish_id} is still used by {} composite(s) and {assignment_count} menu assignment(s)",
                parent_ids.len()
            ),
            Self::ShoppingListNotFound(id) => write!(f, "shopping list not found: {id}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for PlanError {
    fn from(value: ModelValidationError) -> Self {
        match value {
            ModelValidationError::InvalidQuantity { .. } | ModelValidationError::ZeroCount { .. } => {
                Self::InvalidQuantity(value.to_string())
            }
            other => Self::Validation(other),
        }
    }
}

impl From<RepoError> for PlanError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}
