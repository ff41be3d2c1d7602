//! Per-entity list specifications.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::plan::OrderBy;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Lenient parse of `asc` / `desc` in any case. Anything else is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if s.trim().eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a filter value is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Case-insensitive substring match.
    Text,
    /// Equality against one of the declared values (matched case-insensitively).
    Enum(Vec<String>),
    /// Equality against `true` / `false`.
    Boolean,
    /// Field is on or after the given date.
    DateAfter,
    /// Field is on or before the given date.
    DateBefore,
}

/// A filterable field: the stored field name plus how values are coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: String,
    pub kind: FieldKind,
}

/// Static description of what an entity's list screen may search, filter and
/// sort on.
///
/// Built once per entity at startup through [`ListQuerySpec::builder`] and
/// treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuerySpec {
    entity: String,
    searchable_fields: Vec<String>,
    filterable_fields: BTreeMap<String, FieldDescriptor>,
    sortable_fields: BTreeMap<String, String>,
    scope_fields: BTreeMap<String, String>,
    default_sort: OrderBy,
    tie_breaker: Option<String>,
    default_page_size: u32,
    max_page_size: u32,
    min_search_length: usize,
}

impl ListQuerySpec {
    #[must_use]
    pub fn builder(entity: impl Into<String>) -> ListQuerySpecBuilder {
        ListQuerySpecBuilder::new(entity.into())
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[inline]
    #[must_use]
    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    #[inline]
    #[must_use]
    pub fn filterable_fields(&self) -> &BTreeMap<String, FieldDescriptor> {
        &self.filterable_fields
    }

    /// Sort key to stored field.
    #[inline]
    #[must_use]
    pub fn sortable_fields(&self) -> &BTreeMap<String, String> {
        &self.sortable_fields
    }

    /// Stored field backing a scope property, if the entity carries it.
    #[must_use]
    pub fn scope_field(&self, property: &str) -> Option<&str> {
        self.scope_fields.get(property).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn default_sort(&self) -> &OrderBy {
        &self.default_sort
    }

    #[inline]
    #[must_use]
    pub fn tie_breaker(&self) -> Option<&str> {
        self.tie_breaker.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    #[inline]
    #[must_use]
    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    #[inline]
    #[must_use]
    pub fn min_search_length(&self) -> usize {
        self.min_search_length
    }
}

/// Builder for [`ListQuerySpec`].
///
/// Declaration mistakes (duplicate keys, empty names) are collected and
/// reported by [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ListQuerySpecBuilder {
    entity: String,
    searchable_fields: Vec<String>,
    filterable_fields: BTreeMap<String, FieldDescriptor>,
    sortable_fields: BTreeMap<String, String>,
    scope_fields: BTreeMap<String, String>,
    default_sort: Option<OrderBy>,
    tie_breaker: Option<String>,
    default_page_size: u32,
    max_page_size: u32,
    min_search_length: usize,
    duplicates: Vec<String>,
}

impl ListQuerySpecBuilder {
    fn new(entity: String) -> Self {
        Self {
            entity,
            searchable_fields: Vec::new(),
            filterable_fields: BTreeMap::new(),
            sortable_fields: BTreeMap::new(),
            scope_fields: BTreeMap::new(),
            default_sort: None,
            tie_breaker: Some("id".to_owned()),
            default_page_size: 10,
            max_page_size: 100,
            min_search_length: 1,
            duplicates: Vec::new(),
        }
    }

    /// Fields searched (OR-ed, case-insensitive substring) by the free-text query.
    #[must_use]
    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    fn filter(mut self, key: &str, field: &str, kind: FieldKind) -> Self {
        let descriptor = FieldDescriptor {
            field: field.to_owned(),
            kind,
        };
        if self
            .filterable_fields
            .insert(key.to_owned(), descriptor)
            .is_some()
        {
            self.duplicates.push(key.to_owned());
        }
        self
    }

    #[must_use]
    pub fn filter_text(self, key: &str, field: &str) -> Self {
        self.filter(key, field, FieldKind::Text)
    }

    #[must_use]
    pub fn filter_enum<I, S>(self, key: &str, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(key, field, FieldKind::Enum(values))
    }

    #[must_use]
    pub fn filter_bool(self, key: &str, field: &str) -> Self {
        self.filter(key, field, FieldKind::Boolean)
    }

    #[must_use]
    pub fn filter_date_after(self, key: &str, field: &str) -> Self {
        self.filter(key, field, FieldKind::DateAfter)
    }

    #[must_use]
    pub fn filter_date_before(self, key: &str, field: &str) -> Self {
        self.filter(key, field, FieldKind::DateBefore)
    }

    #[must_use]
    pub fn sortable(mut self, key: &str, field: &str) -> Self {
        if self
            .sortable_fields
            .insert(key.to_owned(), field.to_owned())
            .is_some()
        {
            self.duplicates.push(key.to_owned());
        }
        self
    }

    /// Map a scope property (see `carepath_security::properties`) to a stored field.
    #[must_use]
    pub fn scope_field(mut self, property: &str, field: &str) -> Self {
        self.scope_fields.insert(property.to_owned(), field.to_owned());
        self
    }

    #[must_use]
    pub fn default_sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.default_sort = Some(OrderBy::new(field, direction));
        self
    }

    /// Secondary ascending order applied after the primary sort. Defaults to `id`.
    #[must_use]
    pub fn tie_breaker(mut self, field: Option<&str>) -> Self {
        self.tie_breaker = field.map(ToOwned::to_owned);
        self
    }

    #[must_use]
    pub fn page_sizes(mut self, default: u32, max: u32) -> Self {
        self.default_page_size = default;
        self.max_page_size = max;
        self
    }

    #[must_use]
    pub fn min_search_length(mut self, len: usize) -> Self {
        self.min_search_length = len.max(1);
        self
    }

    /// Validate and freeze the spec.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] describing the first inconsistency found.
    pub fn build(self) -> Result<ListQuerySpec, SpecError> {
        let entity = self.entity;

        if let Some(key) = self.duplicates.into_iter().next() {
            return Err(SpecError::DuplicateKey { entity, key });
        }
        if self.default_page_size == 0 {
            return Err(SpecError::ZeroPageSize { entity });
        }
        if self.default_page_size > self.max_page_size {
            return Err(SpecError::DefaultExceedsMax {
                entity,
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        let Some(default_sort) = self.default_sort else {
            return Err(SpecError::MissingDefaultSort { entity });
        };
        if default_sort.field.is_empty() {
            return Err(SpecError::EmptyField {
                entity,
                key: "defaultSort".to_owned(),
            });
        }
        if let Some(field) = self.searchable_fields.iter().find(|f| f.is_empty()) {
            return Err(SpecError::EmptyField {
                entity,
                key: field.clone(),
            });
        }
        for (key, descriptor) in &self.filterable_fields {
            if descriptor.field.is_empty() {
                return Err(SpecError::EmptyField {
                    entity,
                    key: key.clone(),
                });
            }
            if matches!(&descriptor.kind, FieldKind::Enum(values) if values.is_empty()) {
                return Err(SpecError::EmptyEnum {
                    entity,
                    key: key.clone(),
                });
            }
        }
        if let Some((key, _)) = self.sortable_fields.iter().find(|(_, f)| f.is_empty()) {
            return Err(SpecError::EmptyField {
                entity,
                key: key.clone(),
            });
        }

        Ok(ListQuerySpec {
            entity,
            searchable_fields: self.searchable_fields,
            filterable_fields: self.filterable_fields,
            sortable_fields: self.sortable_fields,
            scope_fields: self.scope_fields,
            default_sort,
            tie_breaker: self.tie_breaker.filter(|f| !f.is_empty()),
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            min_search_length: self.min_search_length,
        })
    }
}
