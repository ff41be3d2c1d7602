//! Caller-supplied list parameters and their clamped form.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::spec::{ListQuerySpec, SortDirection};

/// Untrusted list input, typically decoded from a URL query string or a
/// JSON body.
///
/// Nothing here is validated; [`build_plan`](crate::build_plan) clamps,
/// defaults or drops whatever does not fit the entity's spec. Deserializing
/// never fails on a malformed value: it is read as absent instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQueryParams {
    #[serde(deserialize_with = "lenient::number")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "lenient::number")]
    pub page_size: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub search_query: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub sort_by: Option<String>,
    #[serde(deserialize_with = "lenient::direction")]
    pub sort_direction: Option<SortDirection>,
    #[serde(deserialize_with = "lenient::filters")]
    pub filters: BTreeMap<String, String>,
}

impl ListQueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, key: impl Into<String>, direction: Option<SortDirection>) -> Self {
        self.sort_by = Some(key.into());
        self.sort_direction = direction;
        self
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Decode a URL query string (`page=2&pageSize=25&status=active`).
    ///
    /// Recognized keys are `page`, `pageSize`, `search` (or `q`), `sortBy`
    /// and `sortDirection`; every other key becomes a filter. Values that do
    /// not parse are treated as absent, since these strings commonly come from
    /// stale bookmarks.
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query.trim_start_matches('?')).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "undecodable list query string, using defaults");
                Vec::new()
            });

        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = value.trim().parse().ok(),
                "pageSize" | "page_size" => params.page_size = value.trim().parse().ok(),
                "search" | "q" | "searchQuery" => params.search_query = Some(value),
                "sortBy" | "sort_by" => params.sort_by = Some(value),
                "sortDirection" | "sortOrder" | "sort_direction" => {
                    params.sort_direction = SortDirection::parse(&value);
                }
                _ => {
                    params.filters.insert(key, value);
                }
            }
        }
        params
    }

    /// Resolve the effective page and page size for `spec`.
    #[must_use]
    pub fn page_request(&self, spec: &ListQuerySpec) -> PageRequest {
        PageRequest::clamped(
            self.page,
            self.page_size,
            spec.default_page_size(),
            spec.max_page_size(),
        )
    }
}

/// A clamped page position: `page >= 1`, `1 <= page_size <= max`.
///
/// Deserialized values are clamped to `page >= 1` and `page_size >= 1`; the
/// upper bound is the spec's and only applies through
/// [`ListQueryParams::page_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageRequest {
    #[serde(default, deserialize_with = "lenient::number")]
    page: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number")]
    page_size: Option<i64>,
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        Self::clamped(raw.page, raw.page_size, 1, u32::MAX)
    }
}

impl PageRequest {
    /// Clamp raw input into range, falling back to `default_size` when absent.
    #[must_use]
    pub fn clamped(
        page: Option<i64>,
        page_size: Option<i64>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        let max_size = max_size.max(1);
        let page = page.map_or(1, |p| u32::try_from(p.max(1)).unwrap_or(u32::MAX));
        let page_size = page_size.map_or(default_size, |s| {
            u32::try_from(s.max(1)).unwrap_or(u32::MAX)
        });
        Self {
            page,
            page_size: page_size.clamp(1, max_size),
        }
    }

    #[inline]
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Deserializers that read malformed input as absent.
mod lenient {
    use super::{BTreeMap, Deserialize, Deserializer, IgnoredAny, SortDirection};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Bool(bool),
        Text(String),
        Other(IgnoredAny),
    }

    impl Scalar {
        fn into_text(self) -> Option<String> {
            match self {
                Self::Int(n) => Some(n.to_string()),
                Self::Float(f) => Some(f.to_string()),
                Self::Bool(b) => Some(b.to_string()),
                Self::Text(s) => Some(s),
                Self::Other(IgnoredAny) => None,
            }
        }
    }

    /// An integer, or a string holding one.
    pub(super) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Scalar::deserialize(d)? {
            Scalar::Int(n) => Some(n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Float(_) | Scalar::Bool(_) | Scalar::Other(IgnoredAny) => None,
        })
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Scalar::deserialize(d)?.into_text())
    }

    /// `asc`/`desc` in any case.
    pub(super) fn direction<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<SortDirection>, D::Error> {
        Ok(text(d)?.as_deref().and_then(SortDirection::parse))
    }

    /// Scalar values become strings; nested values are dropped.
    pub(super) fn filters<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, String>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Map {
            Entries(BTreeMap<String, Scalar>),
            Other(IgnoredAny),
        }

        Ok(match Map::deserialize(d)? {
            Map::Entries(entries) => entries
                .into_iter()
                .filter_map(|(key, value)| value.into_text().map(|v| (key, v)))
                .collect(),
            Map::Other(IgnoredAny) => BTreeMap::new(),
        })
    }
}
