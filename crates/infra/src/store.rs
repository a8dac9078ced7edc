//! Errors shared by the storage-backed collaborators.

use thiserror::Error;

/// Storage failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Storage("lock poisoned".to_string())
    }
}

/// One page of a listing plus the total row count across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Paged<T> {
    /// Number of pages of `per_page` rows needed for `total`.
    pub fn total_pages(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.total.div_ceil(per_page)
    }
}

/// Slice a 1-based `page` out of `rows`.
pub(crate) fn paginate<T>(rows: Vec<T>, page: u32, per_page: usize) -> Paged<T> {
    let total = rows.len();
    let offset = (page.max(1) as usize - 1).saturating_mul(per_page);
    let items = rows.into_iter().skip(offset).take(per_page).collect();
    Paged { items, total }
}
