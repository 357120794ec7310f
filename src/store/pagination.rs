use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A 1-indexed page request. Construction clamps both fields into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn compute(total_count: i64, request: PageRequest) -> Self {
        let total_count = total_count.max(0);
        let page_size = request.page_size();
        let total_pages = (total_count + page_size - 1) / page_size;
        let page = request.page();

        Self {
            total_count,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 1);

        let req = PageRequest::new(-4, 5000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(2, 7).offset(), 7);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(Pagination::compute(0, PageRequest::new(1, 10)).total_pages, 0);
        assert_eq!(Pagination::compute(1, PageRequest::new(1, 10)).total_pages, 1);
        assert_eq!(Pagination::compute(10, PageRequest::new(1, 10)).total_pages, 1);
        assert_eq!(Pagination::compute(11, PageRequest::new(1, 10)).total_pages, 2);
        assert_eq!(Pagination::compute(25, PageRequest::new(1, 4)).total_pages, 7);
    }

    #[test]
    fn test_navigation_flags() {
        let first = Pagination::compute(25, PageRequest::new(1, 10));
        assert!(first.has_next);
        assert!(!first.has_previous);

        let middle = Pagination::compute(25, PageRequest::new(2, 10));
        assert!(middle.has_next);
        assert!(middle.has_previous);

        let last = Pagination::compute(25, PageRequest::new(3, 10));
        assert!(!last.has_next);
        assert!(last.has_previous);

        let past_end = Pagination::compute(25, PageRequest::new(9, 10));
        assert!(!past_end.has_next);
        assert!(past_end.has_previous);
    }

    #[test]
    fn test_empty_result_set() {
        let p = Pagination::compute(0, PageRequest::default());
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
        assert!(!p.has_next);
        assert!(!p.has_previous);
    }
}
