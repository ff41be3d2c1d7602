//! Plan building.
//!
//! `build_plan` is pure: the same spec and params always yield the same plan.
//! Filter conditions are emitted in the spec's key order, never in the
//! caller's, so two requests that differ only in parameter order share a plan.

use carepath_security::AccessScope;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::condition::Condition;
use crate::page::{PaginatedResult, paginate};
use crate::params::{ListQueryParams, PageRequest};
use crate::scope::scope_conditions;
use crate::spec::{FieldDescriptor, FieldKind, ListQuerySpec, SortDirection};

/// A single ordering term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Abstract, store-agnostic list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// AND-ed conditions.
    pub conditions: Vec<Condition>,
    /// Primary order. Always present.
    pub order_by: OrderBy,
    /// Secondary ascending order that makes paging stable across equal keys.
    pub tie_breaker: Option<OrderBy>,
    pub limit: u32,
    pub offset: u64,
    /// The clamped page this plan fetches.
    pub page: PageRequest,
}

impl QueryPlan {
    /// Wrap fetched rows into the envelope for this plan's page.
    #[must_use]
    pub fn paginate<T>(&self, rows: Vec<T>, total_count: u64) -> PaginatedResult<T> {
        paginate(rows, total_count, self.page)
    }

    /// Ordering terms in application order.
    #[must_use]
    pub fn ordering(&self) -> Vec<&OrderBy> {
        std::iter::once(&self.order_by)
            .chain(self.tie_breaker.as_ref())
            .collect()
    }
}

/// Build a deterministic, bounded plan from `spec` and untrusted `params`.
#[must_use]
pub fn build_plan(spec: &ListQuerySpec, params: &ListQueryParams) -> QueryPlan {
    let page = params.page_request(spec);
    if params.page.is_some_and(|p| p != i64::from(page.page()))
        || params.page_size.is_some_and(|s| s != i64::from(page.page_size()))
    {
        tracing::warn!(
            entity = spec.entity(),
            requested_page = ?params.page,
            requested_page_size = ?params.page_size,
            page = page.page(),
            page_size = page.page_size(),
            "clamped list paging parameters"
        );
    }
    let mut conditions = Vec::new();

    if let Some(search) = search_condition(spec, params.search_query.as_deref()) {
        conditions.push(search);
    }

    let mut dropped = 0_usize;
    for key in params.filters.keys() {
        if !spec.filterable_fields().contains_key(key) {
            dropped += 1;
        }
    }
    for (key, descriptor) in spec.filterable_fields() {
        let Some(raw) = params.filters.get(key) else {
            continue;
        };
        match filter_condition(descriptor, raw) {
            Some(condition) => conditions.push(condition),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::warn!(
            entity = spec.entity(),
            dropped,
            "ignored unknown or unparseable list filters"
        );
    }

    let order_by = resolve_sort(spec, params);
    let tie_breaker = spec
        .tie_breaker()
        .filter(|field| *field != order_by.field)
        .map(|field| OrderBy::new(field, SortDirection::Asc));

    QueryPlan {
        conditions,
        order_by,
        tie_breaker,
        limit: page.page_size(),
        offset: page.offset(),
        page,
    }
}

/// [`build_plan`] with the caller's access scope appended as conditions.
#[must_use]
pub fn build_scoped_plan(
    spec: &ListQuerySpec,
    params: &ListQueryParams,
    scope: &AccessScope,
) -> QueryPlan {
    let mut plan = build_plan(spec, params);
    plan.conditions.extend(scope_conditions(spec, scope));
    plan
}

fn search_condition(spec: &ListQuerySpec, query: Option<&str>) -> Option<Condition> {
    let needle = query.map(str::trim).filter(|q| !q.is_empty())?;
    if needle.chars().count() < spec.min_search_length() || spec.searchable_fields().is_empty() {
        return None;
    }
    let alternatives = spec
        .searchable_fields()
        .iter()
        .map(|field| Condition::contains(field.as_str(), needle))
        .collect();
    Some(Condition::Any(alternatives))
}

fn filter_condition(descriptor: &FieldDescriptor, raw: &str) -> Option<Condition> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let field = descriptor.field.as_str();
    match &descriptor.kind {
        FieldKind::Text => Some(Condition::contains(field, value)),
        FieldKind::Enum(allowed) => allowed
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(value))
            .map(|canonical| Condition::equals_text(field, canonical.as_str())),
        FieldKind::Boolean => parse_bool(value).map(|b| Condition::equals_bool(field, b)),
        FieldKind::DateAfter => parse_date(value).map(|d| Condition::OnOrAfter {
            field: field.to_owned(),
            value: d,
        }),
        FieldKind::DateBefore => parse_date(value).map(|d| Condition::OnOrBefore {
            field: field.to_owned(),
            value: d,
        }),
    }
}

fn resolve_sort(spec: &ListQuerySpec, params: &ListQueryParams) -> OrderBy {
    let Some(key) = params.sort_by.as_deref() else {
        return spec.default_sort().clone();
    };
    match spec.sortable_fields().get(key) {
        Some(field) => OrderBy::new(field.as_str(), params.sort_direction.unwrap_or_default()),
        None => {
            tracing::warn!(
                entity = spec.entity(),
                sort_by = key,
                "unknown sort key, using default order"
            );
            spec.default_sort().clone()
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(value, &Rfc3339)
                .ok()
                .map(OffsetDateTime::date)
        })
}
