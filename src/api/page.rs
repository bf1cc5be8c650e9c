//! Pagination helper for list endpoints.

use std::fmt;

use serde::Serialize;

use crate::orm::Limit;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// One page of a list of `item_count` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub item_count: u64,
    pub page_index: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub offset: u64,
    pub limit: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    /// An empty list, or an index past the last page, yields page 1 with no items.
    pub fn new(item_count: u64, page_index: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let page_count = item_count.div_ceil(page_size);
        let (page_index, offset, limit) = if item_count == 0 || page_index > page_count {
            (1, 0, 0)
        } else {
            (page_index, page_size * (page_index - 1), page_size)
        };
        Self {
            item_count,
            page_index,
            page_size,
            page_count,
            offset,
            limit,
            has_next: page_count > page_index,
            has_previous: page_index > 1,
        }
    }

    /// `Page::new` with the default page size
    pub fn with_default_size(item_count: u64, page_index: u64) -> Self {
        Self::new(item_count, page_index, DEFAULT_PAGE_SIZE)
    }

    /// Row window for the mapper
    pub fn limit_clause(&self) -> Limit {
        Limit::Window {
            offset: self.offset as i64,
            count: self.limit as i64,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "item_count: {}, page_count: {}, page_index: {}, page_size: {}, offset: {}, limit: {}",
            self.item_count, self.page_count, self.page_index, self.page_size, self.offset, self.limit
        )
    }
}

/// Parse a page parameter, falling back to 1
pub fn page_index(page: Option<&str>) -> u64 {
    page.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map(|p| p as u64)
        .unwrap_or(1)
}
