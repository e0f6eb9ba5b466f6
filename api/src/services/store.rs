//! Video persistence
//!
//! [`VideoStore`] is the seam between the ingestion loop / query service and the
//! database. [`PgVideoStore`] is the only production implementation; writes are
//! serialized by PostgreSQL itself.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::videos;
use crate::models::{NewVideo, VideoRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Persist a new video and return it with its assigned id
    async fn create(&self, video: NewVideo) -> Result<VideoRecord, StoreError>;

    /// One page ordered by publish date descending, plus the total record count
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<VideoRecord>, i64), StoreError>;

    /// Up to `limit` videos whose title or description contains `term`
    async fn search_by_text(&self, term: &str, limit: i64) -> Result<Vec<VideoRecord>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgVideoStore {
    db: PgPool,
}

impl PgVideoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn create(&self, video: NewVideo) -> Result<VideoRecord, StoreError> {
        Ok(videos::insert_video(&self.db, &video).await?)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<VideoRecord>, i64), StoreError> {
        let (records, total) = videos::list_videos_with_count(&self.db, limit, offset).await?;

        // The window count is only carried on returned rows
        if records.is_empty() && offset > 0 {
            let total = self.count().await?;
            return Ok((records, total));
        }

        Ok((records, total))
    }

    async fn search_by_text(&self, term: &str, limit: i64) -> Result<Vec<VideoRecord>, StoreError> {
        Ok(videos::search_videos(&self.db, term, limit).await?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(videos::count_videos(&self.db).await?)
    }
}
