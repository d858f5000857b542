//! Listing parameters shared by every searchable collection.
//!
//! Mirrors the DataTables contract the admin UI speaks: free-text search,
//! one order-by column, and `start`/`length` windowing.

use serde::{Deserialize, Serialize};

/// Hard cap on `length`.
pub const MAX_PAGE_LENGTH: u64 = 100;
pub const DEFAULT_PAGE_LENGTH: u64 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Search/sort/window request for a listing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub order_by: Option<String>,
    pub direction: SortDirection,
    pub start: u64,
    pub length: Option<u64>,
}

impl ListQuery {
    /// Effective page size, clamped to `1..=MAX_PAGE_LENGTH`.
    pub fn page_length(&self) -> u64 {
        self.length
            .unwrap_or(DEFAULT_PAGE_LENGTH)
            .clamp(1, MAX_PAGE_LENGTH)
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One window of a listing plus the counts the caller needs to page.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    /// Rows in the collection before search is applied.
    pub total: u64,
    /// Rows matching the search term.
    pub filtered: u64,
    pub rows: Vec<T>,
}

impl<T> ListPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            total: self.total,
            filtered: self.filtered,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}
