//! Page-numbered listings.

use serde::Serialize;

/// One page of a listing with the numbers needed to render a pager.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
    pub page_count: u64,
}

impl<T> Page<T> {
    /// Clamp a requested page number to 1 or above.
    #[must_use]
    pub fn normalize(page: Option<u64>) -> u64 {
        page.unwrap_or(1).max(1)
    }

    /// Row offset of a (normalized) page.
    #[must_use]
    pub const fn offset(page: u64, page_size: u64) -> u64 {
        page.saturating_sub(1).saturating_mul(page_size)
    }

    #[must_use]
    pub const fn new(items: Vec<T>, total_count: u64, page: u64, page_size: u64) -> Self {
        Self {
            items,
            total_count,
            page,
            page_size,
            page_count: total_count.div_ceil(page_size),
        }
    }
}
