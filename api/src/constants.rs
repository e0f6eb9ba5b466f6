//! Application constants

/// Keyword searched when `SEARCH_KEYWORD` is not set
pub const DEFAULT_SEARCH_KEYWORD: &str = "football";

/// Lower bound on upstream publish time when `PUBLISHED_AFTER` is not set
pub const DEFAULT_PUBLISHED_AFTER: &str = "2022-01-01T00:00:00Z";

/// Seconds between ingestion cycles
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 10;

/// Results requested from the provider per cycle
pub const FETCH_MAX_RESULTS: u32 = 10;

/// Largest `maxResults` the search endpoint accepts
pub const PROVIDER_MAX_RESULTS: u32 = 50;

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default page size for `GET /videos`
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Fixed cap on `GET /search` results
pub const SEARCH_RESULT_LIMIT: i64 = 5;
