use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only `Configuration`, `Validation` and `Provider` are produced by the
/// recommendation pipeline; degraded extractions and unresolvable candidates
/// never surface here.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller sent an empty or malformed query.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collaborators missing, not yet initialized, or the catalog is empty.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Extraction or retrieval backend failed (network, auth, quota).
    #[error("Provider error: {0}")]
    Provider(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_NOT_READY",
                    format!("Service not ready: {msg}"),
                )
            }
            AppError::Provider(msg) => {
                tracing::error!("Provider error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_ERROR",
                    "An upstream AI provider error occurred".to_string(),
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
