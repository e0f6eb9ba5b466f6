//! Router test helpers

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::AppState;
use crate::services::ingest::{FailurePolicy, IngestConfig, IngestionLoop};
use crate::services::query::QueryService;
use crate::services::store::VideoStore;
use crate::services::testing::{MemoryStore, ScriptedSource};

/// App state over an in-memory store with an ingestion loop that never runs
pub fn state_with(store: Arc<MemoryStore>) -> Arc<AppState> {
    let store: Arc<dyn VideoStore> = store;
    let ingestion = IngestionLoop::new(
        Arc::new(ScriptedSource::default()),
        store.clone(),
        IngestConfig {
            keyword: "football".to_string(),
            published_after: "2022-01-01T00:00:00Z".parse().unwrap(),
            max_results: 10,
            interval: Duration::from_secs(10),
            failure_policy: FailurePolicy::Halt,
        },
    );

    Arc::new(AppState {
        query: QueryService::new(store),
        ingest: ingestion.monitor(),
    })
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
