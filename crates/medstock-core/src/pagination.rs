//! # Pagination
//!
//! One-based page numbers in, `LIMIT`/`OFFSET` and a page summary out.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::MAX_PAGE_SIZE;

/// Default page size when a caller asks for zero.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A requested page. `page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Pagination { page, page_size }
    }

    /// Clamps page to ≥ 1 and page size into `1..=MAX_PAGE_SIZE`.
    pub fn normalized(&self) -> Self {
        let page_size = match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        Pagination {
            page: self.page.max(1),
            page_size,
        }
    }

    /// SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        i64::from(self.normalized().page_size)
    }

    /// SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        let p = self.normalized();
        i64::from(p.page - 1) * i64::from(p.page_size)
    }
}

/// Page summary returned alongside a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
    /// Equals `page` when there is no next page.
    pub next_page: u32,
    /// Equals `page` when there is no previous page.
    pub previous_page: u32,
}

impl PageInfo {
    /// Builds the summary for `total` matching rows.
    ///
    /// ```rust
    /// use medstock_core::{PageInfo, Pagination};
    ///
    /// let info = PageInfo::calculate(25, &Pagination::new(2, 10));
    /// assert_eq!(info.total_pages, 3);
    /// assert!(info.has_next && info.has_previous);
    /// assert_eq!((info.previous_page, info.next_page), (1, 3));
    /// ```
    pub fn calculate(total: u64, pagination: &Pagination) -> Self {
        let p = pagination.normalized();
        let page_size = u64::from(p.page_size);
        let total_pages = u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX);

        let has_next = p.page < total_pages;
        let has_previous = p.page > 1;

        PageInfo {
            page: p.page,
            page_size: p.page_size,
            total,
            total_pages,
            has_next,
            has_previous,
            next_page: if has_next { p.page + 1 } else { p.page },
            previous_page: if has_previous { p.page - 1 } else { p.page },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 20).offset(), 40);
        assert_eq!(Pagination::new(0, 10).offset(), 0);
        assert_eq!(Pagination::new(1, 0).limit(), i64::from(DEFAULT_PAGE_SIZE));
        assert_eq!(Pagination::new(1, 5000).limit(), i64::from(MAX_PAGE_SIZE));
    }

    #[test]
    fn test_page_info_empty() {
        let info = PageInfo::calculate(0, &Pagination::default());
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_previous);
        assert_eq!(info.next_page, 1);
        assert_eq!(info.previous_page, 1);
    }

    #[test]
    fn test_page_info_last_page() {
        let info = PageInfo::calculate(30, &Pagination::new(3, 10));
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next);
        assert!(info.has_previous);
        assert_eq!(info.next_page, 3);
    }
}
