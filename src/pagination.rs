//! This modules defines the common functionality for paging data.

use serde::Serialize;

use crate::params::clamped_integer;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
    /// The number of transactions per page on the dashboard.
    pub dashboard_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
            dashboard_page_size: 6,
        }
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page, at least one.
    pub per_page: u64,
}

impl PageRequest {
    /// Build a page request from raw query values.
    ///
    /// Missing, non-numeric or zero values fall back to the configured
    /// defaults. The page is at least 1 and the page size is clamped to
    /// `1..=config.max_page_size`.
    pub fn from_query(
        page: Option<&str>,
        per_page: Option<&str>,
        config: &PaginationConfig,
    ) -> Self {
        let page = clamped_integer(page, config.default_page as i64, 1, i64::MAX);
        let per_page = clamped_integer(
            per_page,
            config.default_page_size as i64,
            1,
            config.max_page_size.max(1) as i64,
        );

        Self {
            page: page as u64,
            per_page: per_page as u64,
        }
    }

    /// The number of rows to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// The number of pages needed to show `total` items.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page)
    }
}

/// One page of results along with the information needed to page through the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page.
    #[serde(rename = "transactions")]
    pub items: Vec<T>,
    /// The number of items across all pages.
    pub total: u64,
    /// The number of pages.
    pub total_pages: u64,
    /// The page number of this page.
    pub current_page: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the query results.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            total_pages: request.page_count(total),
            current_page: request.page,
        }
    }
}
