use serde::{Deserialize, Serialize};

use crate::models::{ListQuery, Page};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    /// `created_at` for oldest first, `-created_at` (default) for newest first.
    pub sort: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        ListQuery::new(params.page, params.page_size, params.search, params.sort.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub invoice_id: Option<String>,
}

impl PaymentListParams {
    pub fn into_parts(self) -> (ListQuery, Option<String>) {
        let query = ListQuery::new(self.page, self.page_size, self.search, self.sort.as_deref());
        (query, self.invoice_id)
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T, U: From<T>> From<Page<T>> for ListResponse<U> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
            items: page.items.into_iter().map(U::from).collect(),
        }
    }
}
