pub mod activities;
pub mod auth;
pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod health;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::validation::Pagination;

/// Common list-endpoint query string: ?page&limit&search
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page, self.limit)
    }

    /// Sanitized search term, or None when blank
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(crate::validation::sanitize_search)
            .filter(|s| !s.is_empty())
    }
}

pub fn pagination_json(page: Pagination, total: i64) -> Value {
    json!({
        "page": page.page,
        "limit": page.limit,
        "total": total,
        "pages": page.pages(total),
    })
}
