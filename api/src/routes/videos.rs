//! Video read endpoints (/videos, /search)

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::models::VideoRecord;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/search", get(search_videos))
}

#[derive(Deserialize)]
struct ListVideosQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Serialize)]
struct VideoListResponse {
    status: &'static str,
    data: Vec<VideoRecord>,
    next_page: i64,
    prev_page: i64,
    total_pages: i64,
}

/// GET /videos - One page of stored videos, newest first
async fn list_videos(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListVideosQuery>, QueryRejection>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let Query(query) = query.log_api("Invalid /videos query")?;

    let page = state
        .query
        .list(query.page, query.limit)
        .await
        .log_api("List videos error")?;

    Ok(Json(VideoListResponse {
        status: "success",
        data: page.videos,
        next_page: page.pagination.next_page,
        prev_page: page.pagination.prev_page,
        total_pages: page.pagination.total_pages,
    }))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct SearchResponse {
    status: &'static str,
    data: Vec<VideoRecord>,
}

/// GET /search?q= - Up to five videos whose title or description contains `q`
async fn search_videos(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(query) = query.log_api("Invalid /search query")?;

    let videos = state
        .query
        .search(&query.q)
        .await
        .log_api("Search videos error")?;

    Ok(Json(SearchResponse {
        status: "success",
        data: videos,
    }))
}
