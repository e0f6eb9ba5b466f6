//! Health endpoint (/health)

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::services::ingest::IngestStatus;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ingestion: IngestStatus,
}

/// GET /health - Reads stay available when ingestion has halted; check `ingestion.phase`
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ingestion: state.ingest.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{get_json, state_with};
    use crate::services::testing::MemoryStore;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn reports_ingestion_status() {
        let app = routes().with_state(state_with(Arc::new(MemoryStore::new())));

        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ingestion"]["phase"], "idle");
        assert_eq!(body["ingestion"]["cycles"], 0);
        assert!(body["ingestion"]["last_error"].is_null());
    }
}
