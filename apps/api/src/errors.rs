use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::outreach::{OutreachError, JOB_PARSE_MESSAGE};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("{}", JOB_PARSE_MESSAGE)]
    JobParse(#[source] serde_json::Error),
}

impl From<OutreachError> for AppError {
    fn from(err: OutreachError) -> Self {
        match err {
            OutreachError::Remote(e) => AppError::Llm(e),
            OutreachError::JobParse { source } => AppError::JobParse(source),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The language model service failed to respond".to_string(),
                )
            }
            AppError::JobParse(e) => {
                tracing::warn!("Job parse error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "JOB_PARSE_ERROR",
                    JOB_PARSE_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
