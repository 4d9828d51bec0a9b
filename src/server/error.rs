//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// An unexpected failure, reported as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }

    /// 500 for a failed `/api/chat` request.
    pub fn chat(err: impl std::fmt::Display) -> Self {
        Self::internal(format!("Error processing request: {err}"))
    }

    /// 500 for a failed `/api/classify` request.
    pub fn classify(err: impl std::fmt::Display) -> Self {
        Self::internal(format!("Error processing image: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.message);
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
