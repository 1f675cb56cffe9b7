//! Record-level validation errors shared by all model types.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for a single domain record.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// A required identifier is blank after trim.
    BlankId(&'static str),
    /// A required display name is blank after trim.
    BlankName(&'static str),
    /// Servings or portions must be at least one.
    ZeroCount { field: &'static str },
    /// Quantity is negative, NaN or infinite.
    InvalidQuantity { context: String, value: f64 },
    /// Two components of one composite share the same `order`.
    DuplicateComponentOrder { dish_id: String, order: i64 },
    /// A composite lists itself as a component.
    SelfReference(String),
    /// Date range ends before it starts.
    InvertedDateRange { start: String, end: String },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId(field) => write!(f, "{field} must not be blank"),
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::ZeroCount { field } => write!(f, "{field} must be >= 1"),
            Self::InvalidQuantity { context, value } => {
                write!(f, "invalid quantity {value} for {context}")
            }
            Self::DuplicateComponentOrder { dish_id, order } => write!(
                f,
                "composite dish `{dish_id}` has more than one component at order {order}"
            ),
            Self::SelfReference(dish_id) => {
                write!(f, "composite dish `{dish_id}` cannot contain itself")
            }
            Self::InvertedDateRange { start, end } => {
                write!(f, "date range end ({end}) must be >= start ({start})")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Rejects negative, NaN and infinite quantities.
pub fn ensure_valid_quantity(value: f64, context: impl Into<String>) -> Result<(), ModelValidationError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ModelValidationError::InvalidQuantity {
        context: context.into(),
        value,
    })
}

pub(crate) fn ensure_not_blank(value: &str, field: &'static str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankName(field));
    }
    Ok(())
}

pub(crate) fn ensure_id_not_blank(value: &str, field: &'static str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankId(field));
    }
    Ok(())
}

pub(crate) fn ensure_positive_count(value: u32, field: &'static str) -> Result<(), ModelValidationError> {
    if value == 0 {
        return Err(ModelValidationError::ZeroCount { field });
    }
    Ok(())
}
