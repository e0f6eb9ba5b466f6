//! YouTube Data API search client
//!
//! Only the `search.list` endpoint is used. Results are returned as [`RawItem`]s
//! in provider order; mapping into persisted records happens in the ingestion loop.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::constants::PROVIDER_MAX_RESULTS;

/// Result ordering requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// Most recently published first
    Date,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Date => "date",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub keyword: String,
    /// Inclusive lower bound on publish time
    pub published_after: DateTime<Utc>,
    pub max_results: u32,
    pub order: SearchOrder,
}

/// One unprocessed search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub thumbnails: Thumbnails,
}

/// Thumbnail variants of a result. Only `high` is stored; the provider's other
/// sizes are skipped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Errors from the video source. Neither variant is retried here.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Provider unreachable, overloaded, or credentials rejected
    #[error("video source unavailable: {0}")]
    Unavailable(String),
    /// Malformed query or application-level provider error
    #[error("video source query failed: {0}")]
    Query(String),
}

/// Something that can be searched for videos
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawItem>, SourceError>;
}

#[derive(Clone)]
pub struct YoutubeClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl fmt::Debug for YoutubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl YoutubeClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl VideoSource for YoutubeClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawItem>, SourceError> {
        if request.keyword.trim().is_empty() {
            return Err(SourceError::Query("keyword must not be empty".to_string()));
        }

        let url = format!("{}/search", self.base_url);
        let max_results = request.max_results.clamp(1, PROVIDER_MAX_RESULTS).to_string();
        let published_after = request
            .published_after
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        // without_url() keeps the API key out of error messages
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("part", "id,snippet"),
                ("q", request.keyword.as_str()),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("order", request.order.as_str()),
                ("publishedAfter", published_after.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let body: SearchListResponse = resp.json().await.map_err(|e| {
            SourceError::Query(format!("malformed search response: {}", e.without_url()))
        })?;

        Ok(body.into_items())
    }
}

/// Map a non-2xx provider response onto the source error taxonomy
fn classify_failure(status: StatusCode, body: &str) -> SourceError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let key_rejected = envelope
        .iter()
        .flat_map(|e| e.error.errors.iter())
        .any(|detail| detail.reason == "keyInvalid");

    let message = envelope
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let detail = format!("{}: {}", status, message);

    let unavailable = key_rejected
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error();

    if unavailable {
        SourceError::Unavailable(detail)
    } else {
        SourceError::Query(detail)
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

impl SearchListResponse {
    fn into_items(self) -> Vec<RawItem> {
        self.items
            .into_iter()
            .filter(|item| {
                item.id
                    .as_ref()
                    .is_none_or(|id| id.kind == "youtube#video")
            })
            .filter_map(|item| item.snippet)
            .map(|snippet| RawItem {
                title: snippet.title,
                description: snippet.description,
                published_at: snippet.published_at,
                thumbnails: snippet.thumbnails,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    id: Option<ResourceId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}
