//! Listing parameters and paged results shared by every collection.

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Normalized listing parameters. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u64,
    pub page_size: u64,
    pub search: Option<String>,
    pub newest_first: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            newest_first: true,
        }
    }
}

impl ListQuery {
    /// Clamps raw client values into the supported range.
    pub fn new(
        page: Option<u64>,
        page_size: Option<u64>,
        search: Option<String>,
        sort: Option<&str>,
    ) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            search,
            newest_first: !matches!(sort, Some("created_at")),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped() {
        let query = ListQuery::new(Some(0), Some(500), None, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, MAX_PAGE_SIZE);

        let query = ListQuery::new(None, Some(0), Some("  ".into()), Some("created_at"));
        assert_eq!(query.page_size, 1);
        assert_eq!(query.search, None);
        assert!(!query.newest_first);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page {
            items: vec![],
            total: 51,
            page: 1,
            page_size: 25,
        };
        assert_eq!(page.total_pages(), 3);
        assert_eq!(ListQuery::new(Some(3), Some(25), None, None).skip(), 50);
    }
}
