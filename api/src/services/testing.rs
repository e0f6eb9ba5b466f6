//! In-memory fakes for the store and video source

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::models::{NewVideo, VideoRecord};
use crate::services::store::{StoreError, VideoStore};
use crate::youtube::{RawItem, SearchRequest, SourceError, Thumbnail, Thumbnails, VideoSource};

pub fn thumbnail(url: &str) -> Thumbnail {
    Thumbnail {
        url: url.to_string(),
    }
}

pub fn raw_item(title: &str, description: &str, published_at: &str) -> RawItem {
    RawItem {
        title: title.to_string(),
        description: description.to_string(),
        published_at: published_at.to_string(),
        thumbnails: Thumbnails {
            high: Some(thumbnail(&format!("https://i.ytimg.com/{}/hq.jpg", title))),
        },
    }
}

pub fn new_video(title: &str, description: &str, publish_date: &str) -> NewVideo {
    NewVideo::from(raw_item(title, description, publish_date))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<VideoRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(videos: Vec<NewVideo>) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.lock().unwrap();
            for video in videos {
                let id = records.len() as i64 + 1;
                records.push(video.with_id(id));
            }
        }
        store
    }

    /// Records in insertion order
    pub fn records(&self) -> Vec<VideoRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn sorted(&self) -> Vec<VideoRecord> {
        let mut records = self.records();
        records.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        records
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn create(&self, video: NewVideo) -> Result<VideoRecord, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence(sqlx::Error::PoolClosed));
        }
        let mut records = self.records.lock().unwrap();
        let record = video.with_id(records.len() as i64 + 1);
        records.push(record.clone());
        Ok(record)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<VideoRecord>, i64), StoreError> {
        self.check_reads()?;
        let sorted = self.sorted();
        let total = sorted.len() as i64;
        let page = sorted
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn search_by_text(&self, term: &str, limit: i64) -> Result<Vec<VideoRecord>, StoreError> {
        self.check_reads()?;
        let needle = term.to_lowercase();
        Ok(self
            .sorted()
            .into_iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
            })
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        self.check_reads()?;
        Ok(self.records.lock().unwrap().len() as i64)
    }
}

/// Replays scripted responses, then keeps returning `fallback`
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<RawItem>, SourceError>>>,
    fallback: Vec<RawItem>,
    requests: Mutex<Vec<SearchRequest>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn repeating(items: Vec<RawItem>) -> Self {
        Self {
            fallback: items,
            ..Self::default()
        }
    }

    pub fn then(self, response: Result<Vec<RawItem>, SourceError>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSource for ScriptedSource {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawItem>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(self.fallback.clone()),
        }
    }
}
