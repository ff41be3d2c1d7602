//! Store-agnostic plan conditions.

use time::Date;
use uuid::Uuid;

/// Typed value for an equality condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// One predicate of a [`QueryPlan`](crate::QueryPlan).
///
/// Top-level plan conditions are AND-ed. The data-access layer translates
/// each variant into its own query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Case-insensitive substring match.
    Contains { field: String, value: String },
    /// Equality (case-insensitive for text).
    Equals { field: String, value: FilterValue },
    /// Field date is on or after `value`.
    OnOrAfter { field: String, value: Date },
    /// Field date is on or before `value`.
    OnOrBefore { field: String, value: Date },
    /// Field is one of `values`.
    In { field: String, values: Vec<Uuid> },
    /// Field has no value (e.g. a soft-delete timestamp that was never set).
    IsNull { field: String },
    /// At least one nested condition holds.
    Any(Vec<Condition>),
    /// Every nested condition holds.
    All(Vec<Condition>),
    /// Matches nothing.
    Never,
}

impl Condition {
    #[must_use]
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn equals_text(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: FilterValue::Text(value.into()),
        }
    }

    #[must_use]
    pub fn equals_bool(field: impl Into<String>, value: bool) -> Self {
        Self::Equals {
            field: field.into(),
            value: FilterValue::Bool(value),
        }
    }

    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn is_in(field: impl Into<String>, values: Vec<Uuid>) -> Self {
        Self::In {
            field: field.into(),
            values,
        }
    }
}
