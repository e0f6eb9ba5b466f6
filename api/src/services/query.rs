//! Read side: paginated listing and text search over stored videos

use std::sync::Arc;

use crate::constants::{DEFAULT_PAGE_SIZE, SEARCH_RESULT_LIMIT};
use crate::models::VideoRecord;
use crate::services::store::{StoreError, VideoStore};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Page arithmetic for a listing. `0` in `next_page`/`prev_page` means "no such page".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total_pages: i64,
    pub next_page: i64,
    pub prev_page: i64,
}

impl Pagination {
    /// `limit` must be positive
    pub fn compute(page: i64, limit: i64, total: i64) -> Self {
        let mut total_pages = total / limit;
        if total % limit != 0 {
            total_pages += 1;
        }

        let next_page = if page < total_pages { page + 1 } else { 0 };
        let prev_page = if page > 1 { page - 1 } else { 0 };

        Self {
            total_pages,
            next_page,
            prev_page,
        }
    }
}

/// Rows skipped before `page`; `None` on overflow
pub fn page_offset(page: i64, limit: i64) -> Option<i64> {
    (page - 1).checked_mul(limit)
}

#[derive(Debug, Clone)]
pub struct VideoPage {
    pub videos: Vec<VideoRecord>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn VideoStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn VideoStore>) -> Self {
        Self { store }
    }

    /// List one page of videos, newest first.
    /// `page` defaults to 1 and `limit` to 10; values below 1 are rejected.
    pub async fn list(&self, page: Option<i64>, limit: Option<i64>) -> Result<VideoPage, QueryError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(QueryError::InvalidArgument(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        if limit < 1 {
            return Err(QueryError::InvalidArgument(format!(
                "limit must be at least 1, got {}",
                limit
            )));
        }

        let offset = page_offset(page, limit)
            .ok_or_else(|| QueryError::InvalidArgument(format!("page {} is out of range", page)))?;

        let (videos, total) = self.store.list(limit, offset).await?;
        let pagination = Pagination::compute(page, limit, total);

        Ok(VideoPage { videos, pagination })
    }

    /// Up to five videos whose title or description contains `term`
    pub async fn search(&self, term: &str) -> Result<Vec<VideoRecord>, QueryError> {
        if term.trim().is_empty() {
            return Err(QueryError::InvalidArgument(
                "search term must not be empty".to_string(),
            ));
        }

        Ok(self.store.search_by_text(term, SEARCH_RESULT_LIMIT).await?)
    }
}
