//! Endpoint handlers
//!
//! Inference is CPU bound, so both model-backed handlers move the
//! work onto tokio's blocking pool.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error::ApiError, state::AppState};
use crate::application::classify_use_case::UploadedFile;
use crate::infra::model_loader::ModelStatus;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models: ModelStatus,
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::chat(e.body_text()))?;
    debug!("Chat message: {:?}", req.message);

    let assistant = state.assistant.clone();
    let response = tokio::task::spawn_blocking(move || assistant.chat.reply(&req.message))
        .await
        .map_err(ApiError::chat)?
        .map_err(|e| ApiError::chat(format!("{e:#}")))?;

    Ok(Json(ChatResponse { response }))
}

/// `POST /api/classify`
///
/// A request that is not multipart at all is treated the same as
/// one without a `file` field.
pub async fn classify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let file = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(e) => {
            debug!("Classify request without multipart body: {e}");
            None
        }
    };

    let assistant = state.assistant.clone();
    let outcome = tokio::task::spawn_blocking(move || assistant.classify.classify(file))
        .await
        .map_err(ApiError::classify)?
        .map_err(|e| ApiError::classify(format!("{e:#}")))?;

    Ok(Json(ClassifyResponse { result: outcome.message().to_string() }))
}

/// First field named `file` that carries a filename. A plain form
/// value called `file` is not an upload.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(ApiError::classify)? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(ApiError::classify)?;
        debug!("Received upload '{}' ({} bytes)", filename, bytes.len());
        return Ok(Some(UploadedFile { filename, bytes: bytes.to_vec() }));
    }
    Ok(None)
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models: state.assistant.status(),
    })
}
