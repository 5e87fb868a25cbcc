//! Pagination contract shared by the listing operations.

use serde::Serialize;

/// One page of a listing, together with the totals the API contract
/// requires.
///
/// `total` is counted independently of the slice, so a page past the end is
/// a valid (empty) page, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub page: u32,
    pub per_page: u32,
    /// Total matching rows across all pages.
    pub total: i64,
    /// `ceil(total / per_page)`; 0 when there are no rows.
    pub total_pages: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice and an independently counted
    /// total. Assumes `page >= 1` and `per_page >= 1` (validated at the API
    /// boundary).
    pub fn new(page: u32, per_page: u32, total: i64, items: Vec<T>) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
            items,
        }
    }

    /// Row offset of this page: `(page - 1) * per_page`.
    pub fn offset(page: u32, per_page: u32) -> i64 {
        (i64::from(page) - 1) * i64::from(per_page)
    }
}

/// Ceiling division of `total` by `per_page`.
pub fn total_pages(total: i64, per_page: u32) -> i64 {
    let per_page = i64::from(per_page);
    (total + per_page - 1) / per_page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_exact_division() {
        assert_eq!(total_pages(50, 10), 5);
        assert_eq!(total_pages(100, 100), 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(51, 10), 6);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(99, 100), 1);
    }

    #[test]
    fn test_total_pages_empty() {
        assert_eq!(total_pages(0, 50), 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Page::<()>::offset(1, 50), 0);
        assert_eq!(Page::<()>::offset(3, 10), 20);
    }

    #[test]
    fn test_page_assembly() {
        let page = Page::new(2, 10, 35, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.items.len(), 5);
    }
}
