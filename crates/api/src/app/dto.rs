use serde::Deserialize;
use validator::Validate;

use twinapi_core::validation::not_blank;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    // Missing `name` binds as "" so the validator, not the JSON extractor, rejects it.
    #[serde(default, alias = "Name")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[serde(default, alias = "Name")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
}

/// `?page=&pageSize=` paging; both optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

impl PageQuery {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Rows skipped: `(page - 1) * pageSize`, with pages below 1 read as 1.
    pub fn offset(&self) -> usize {
        let pages_before = self.page.max(1) - 1;
        usize::try_from(pages_before.saturating_mul(self.page_size.max(0))).unwrap_or(usize::MAX)
    }

    /// Rows returned; a negative page size yields an empty page.
    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size.max(0)).unwrap_or(usize::MAX)
    }
}
