use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationParams {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn get_offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }

    /// 当前页越界时收敛到最后一页（空列表为第 1 页）
    pub fn clamp_to(&self, total: usize) -> Self {
        let total_pages = total_pages(total, self.per_page);
        Self {
            page: self.page.min(total_pages),
            per_page: self.per_page,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.get_offset().min(items.len());
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }
}

/// Number of pages for `total` items; an empty list still has one page.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(per_page.max(1))
    }
}

impl PaginationInfo {
    pub fn new(current_page: usize, per_page: usize, total: usize) -> Self {
        let total_pages = total_pages(total, per_page);

        Self {
            current_page,
            per_page,
            total,
            total_pages,
            has_prev: current_page > 1,
            has_next: current_page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams::new(2, 10);
        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 10);
        assert_eq!(params.get_offset(), 10);
    }

    #[test]
    fn test_pagination_params_minimums() {
        let params = PaginationParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);
        assert_eq!(params.get_offset(), 0);
    }

    #[test]
    fn test_clamp_to_last_page() {
        let params = PaginationParams::new(3, 10);
        assert_eq!(params.clamp_to(25).page, 3);
        assert_eq!(params.clamp_to(10).page, 1);
        assert_eq!(params.clamp_to(0).page, 1);
    }

    #[test]
    fn test_slice() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(PaginationParams::new(3, 10).slice(&items), &[20, 21, 22, 23, 24]);
        assert!(PaginationParams::new(4, 10).slice(&items).is_empty());
    }

    #[test]
    fn test_pagination_info() {
        let info = PaginationInfo::new(2, 10, 25);
        assert_eq!(info.current_page, 2);
        assert_eq!(info.per_page, 10);
        assert_eq!(info.total, 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_prev);
        assert!(info.has_next);
    }

    #[test]
    fn test_pagination_info_empty() {
        let info = PaginationInfo::new(1, 10, 0);
        assert_eq!(info.total_pages, 1);
        assert!(!info.has_prev);
        assert!(!info.has_next);
    }
}
