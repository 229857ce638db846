//! Page selection over ranked lists.

use serde::{Deserialize, Serialize};

/// Default rows per page.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Clamp the page into `1..=total_pages` for a list of `total_items`.
    pub fn clamp_to(&self, total_items: usize) -> Self {
        let total_pages = total_pages(total_items, self.per_page).max(1);
        Self {
            page: self.page.min(total_pages),
            per_page: self.per_page,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }

    /// Slice out this page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.per_page as usize).min(items.len());
        &items[start..end]
    }
}

fn total_pages(total_items: usize, per_page: u32) -> u32 {
    (total_items as u32).div_ceil(per_page.max(1))
}

/// Pagination metadata in responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationMeta {
    #[serde(alias = "page")]
    pub current_page: u32,
    pub per_page: u32,
    #[serde(alias = "total")]
    pub total_count: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: usize) -> Self {
        let total_pages = total_pages(total_items, pagination.per_page);
        Self {
            current_page: pagination.page,
            per_page: pagination.per_page,
            total_count: total_items as u32,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}
