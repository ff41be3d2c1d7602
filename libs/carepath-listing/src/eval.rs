//! In-memory plan evaluation.
//!
//! Executes a [`QueryPlan`] against rows held in memory. Real deployments hand
//! plans to a database; this evaluator backs the in-process repositories used
//! by tests and fixed reference data.

use std::cmp::Ordering;

use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::condition::{Condition, FilterValue};
use crate::plan::{OrderBy, QueryPlan};
use crate::spec::SortDirection;

/// A field value as seen by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Uuid(Uuid),
    Date(Date),
    DateTime(OffsetDateTime),
}

impl FieldValue {
    fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Uuid(_) => 3,
            Self::Date(_) | Self::DateTime(_) => 4,
            Self::Text(_) => 5,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<OffsetDateTime> for FieldValue {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A row whose fields can be looked up by their spec field name.
pub trait Record {
    /// Value of `field`, or [`FieldValue::Null`] when the row has no such field.
    fn field(&self, field: &str) -> FieldValue;
}

/// `true` when `row` satisfies every condition.
#[must_use]
pub fn matches_all<R: Record>(row: &R, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(row, c))
}

/// `true` when `row` satisfies `condition`.
#[must_use]
pub fn matches<R: Record>(row: &R, condition: &Condition) -> bool {
    match condition {
        Condition::Contains { field, value } => match row.field(field) {
            FieldValue::Text(text) => text.to_lowercase().contains(&value.to_lowercase()),
            _ => false,
        },
        Condition::Equals { field, value } => match (row.field(field), value) {
            (FieldValue::Text(text), FilterValue::Text(expected)) => {
                text.eq_ignore_ascii_case(expected)
            }
            (FieldValue::Bool(b), FilterValue::Bool(expected)) => b == *expected,
            _ => false,
        },
        Condition::OnOrAfter { field, value } => {
            row.field(field).as_date().is_some_and(|d| d >= *value)
        }
        Condition::OnOrBefore { field, value } => {
            row.field(field).as_date().is_some_and(|d| d <= *value)
        }
        Condition::In { field, values } => match row.field(field) {
            FieldValue::Uuid(id) => values.contains(&id),
            _ => false,
        },
        Condition::IsNull { field } => row.field(field) == FieldValue::Null,
        Condition::Any(nested) => nested.iter().any(|c| matches(row, c)),
        Condition::All(nested) => nested.iter().all(|c| matches(row, c)),
        Condition::Never => false,
    }
}

/// Compare two field values. Nulls sort first; text compares case-insensitively.
#[must_use]
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
        (FieldValue::Int(x), FieldValue::Int(y)) => x.cmp(y),
        (FieldValue::Uuid(x), FieldValue::Uuid(y)) => x.cmp(y),
        (FieldValue::DateTime(x), FieldValue::DateTime(y)) => x.cmp(y),
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Date(x), FieldValue::DateTime(y)) => x.cmp(&y.date()),
        (FieldValue::DateTime(x), FieldValue::Date(y)) => x.date().cmp(y),
        _ => a.rank().cmp(&b.rank()),
    }
}

fn compare_rows<R: Record>(a: &R, b: &R, ordering: &[&OrderBy]) -> Ordering {
    for term in ordering {
        let ord = compare_values(&a.field(&term.field), &b.field(&term.field));
        let ord = match term.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Execute `plan` over `rows`, returning the requested page and the total
/// number of matching rows.
#[must_use]
pub fn execute<'a, R, I>(rows: I, plan: &QueryPlan) -> (Vec<R>, u64)
where
    R: Record + Clone + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut matched: Vec<&R> = rows
        .into_iter()
        .filter(|row| matches_all(*row, &plan.conditions))
        .collect();
    let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);

    let ordering = plan.ordering();
    matched.sort_by(|a, b| compare_rows(*a, *b, &ordering));

    let offset = usize::try_from(plan.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(plan.limit).unwrap_or(usize::MAX);
    let page = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    (page, total)
}
