//! Shared data models used across modules

use serde::{Deserialize, Serialize};

use crate::youtube::RawItem;

/// A persisted video. Immutable once the store has assigned its `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Upstream timestamp kept as text; sorted on its string form
    pub publish_date: String,
    pub thumbnail_url: String,
}

/// A video that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub publish_date: String,
    pub thumbnail_url: String,
}

impl NewVideo {
    /// Attach a store-assigned id
    #[cfg(test)]
    pub fn with_id(self, id: i64) -> VideoRecord {
        VideoRecord {
            id,
            title: self.title,
            description: self.description,
            publish_date: self.publish_date,
            thumbnail_url: self.thumbnail_url,
        }
    }
}

impl From<RawItem> for NewVideo {
    fn from(item: RawItem) -> Self {
        let thumbnail_url = item
            .thumbnails
            .high
            .map(|thumb| thumb.url)
            .unwrap_or_default();

        Self {
            title: item.title,
            description: item.description,
            publish_date: item.published_at,
            thumbnail_url,
        }
    }
}
