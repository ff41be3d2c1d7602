//! Paginated result envelope.

use serde::{Deserialize, Serialize};

use crate::params::PageRequest;

/// Page metadata returned with every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_count: u64,
}

impl Pagination {
    /// Metadata for `page` of a result set with `total_count` rows.
    #[must_use]
    pub fn new(page: PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(page.page_size()));
        Self {
            page: page.page(),
            page_size: page.page_size(),
            total_pages,
            has_next_page: u64::from(page.page()) < total_pages,
            has_previous_page: page.page() > 1,
            total_count,
        }
    }
}

/// Uniform list response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> PaginatedResult<T> {
    /// A failed list response, used when translating a data-access error at
    /// the request boundary.
    #[must_use]
    pub fn failure(error: impl Into<String>, page: PageRequest) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            pagination: Pagination::new(page, 0),
            error: Some(error.into()),
        }
    }

    /// Convert the row type, keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            success: self.success,
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
            error: self.error,
        }
    }
}

/// Wrap fetched rows into the envelope.
///
/// Pure arithmetic. Rows beyond `page_size` are truncated; a page past the
/// last one yields empty data with correct metadata rather than an error.
#[must_use]
pub fn paginate<T>(mut rows: Vec<T>, total_count: u64, page: PageRequest) -> PaginatedResult<T> {
    let limit = usize::try_from(page.page_size()).unwrap_or(usize::MAX);
    rows.truncate(limit);
    PaginatedResult {
        success: true,
        data: rows,
        pagination: Pagination::new(page, total_count),
        error: None,
    }
}
