/// Page-number pagination shared by every listing
///
/// Pages are 1-indexed with a fixed size of [`PER_PAGE`]. A page past the end
/// yields an empty item list rather than an error.

use serde::{Deserialize, Serialize};

/// Fixed page size for all listings
pub const PER_PAGE: i64 = 10;

/// A requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-indexed page number
    pub page: i64,

    /// Items per page
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Creates a request for `page`, clamping anything below 1 to the first page
    pub fn new(page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: PER_PAGE,
        }
    }

    /// Parses a raw `page` query value
    ///
    /// Missing or non-numeric input falls back to page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the totals needed to render pagination links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };

        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            pages,
            has_next: request.page < pages,
            has_prev: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_first_page() {
        assert_eq!(PageRequest::parse(None).page, 1);
        assert_eq!(PageRequest::parse(Some("abc")).page, 1);
        assert_eq!(PageRequest::parse(Some("")).page, 1);
        assert_eq!(PageRequest::parse(Some("3")).page, 3);
    }

    #[test]
    fn test_non_positive_pages_clamp_to_one() {
        assert_eq!(PageRequest::new(0).page, 1);
        assert_eq!(PageRequest::new(-4).page, 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1).offset(), 0);
        assert_eq!(PageRequest::new(3).offset(), 20);
        assert_eq!(PageRequest::new(3).limit(), PER_PAGE);
    }

    #[test]
    fn test_page_totals() {
        let page: Page<i32> = Page::new(vec![1; 10], PageRequest::new(1), 25);
        assert_eq!(page.pages, 3);
        assert!(page.has_next);
        assert!(!page.has_prev);

        let last: Page<i32> = Page::new(vec![1; 5], PageRequest::new(3), 25);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_error() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::new(9), 25);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 9);
        assert!(!page.has_next);
    }

    #[test]
    fn test_empty_listing() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::default(), 0);
        assert_eq!(page.pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }
}
