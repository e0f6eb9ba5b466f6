//! Error handling utilities for route handlers

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::query::QueryError;

/// Error returned by handlers. Rendered as `{"status":"error","data":[],"message":...}`
/// so clients always get the same envelope as a successful response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "data": [],
            "message": self.message,
        }));

        (self.status, body).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidArgument(msg) => Self::bad_request(msg),
            // storage details stay in the logs
            QueryError::Store(_) => Self::internal("failed to read videos"),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Extension trait for logging errors and converting to [`ApiError`]
pub trait LogErr<T> {
    /// Log error with context at a level matching the resulting status
    fn log_api(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E> LogErr<T> for Result<T, E>
where
    E: Into<ApiError> + fmt::Display,
{
    fn log_api(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            let detail = e.to_string();
            let err: ApiError = e.into();
            if err.status.is_server_error() {
                tracing::error!(error = %detail, "{}", context);
            } else {
                tracing::debug!(error = %detail, "{}", context);
            }
            err
        })
    }
}
