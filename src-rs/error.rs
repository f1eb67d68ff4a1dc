//! Error types shared across the pipeline stages, the task store and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::task::TaskStatus;

/// Lyrics lookup failures.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("song not found: {0}")]
    NotFound(String),

    #[error("could not extract lyrics from {0}")]
    ParseFailure(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Lyrics analysis failures.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis failed: {0}")]
    Remote(String),

    #[error("analysis failed: model returned an empty response")]
    EmptyResponse,

    #[error("analysis failed: network error: {0}")]
    Network(String),
}

/// Image generation failures.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("image generation failed: {0}")]
    Remote(String),

    #[error("image generation is not configured: {0}")]
    NotConfigured(String),

    #[error("failed to download generated image: {0}")]
    Download(String),

    #[error("failed to save generated image: {0}")]
    Persist(#[from] std::io::Error),

    #[error("image generation failed: network error: {0}")]
    Network(String),
}

/// A write the task state machine does not allow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("task is already {0} and cannot change")]
    Terminal(TaskStatus),

    #[error("cannot move task from {from} to {to}")]
    OutOfOrder { from: TaskStatus, to: TaskStatus },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("task already exists: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("task store lock poisoned")]
    Poisoned,
}

/// Errors surfaced to callers of the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("task not found: {0}")]
    NotFound(String),

    #[error("service is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lyrics(#[from] LyricsError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    MissingKey(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to build http client: {0}")]
    Client(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Body was not JSON (415)
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Shutting down (503)
    #[error("{0}")]
    Unavailable(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::InvalidInput(msg) => ApiError::BadRequest(msg),
            OrchestratorError::NotFound(id) => ApiError::NotFound(format!("task not found: {}", id)),
            OrchestratorError::ShuttingDown => ApiError::Unavailable(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
