//! Axum route handlers for the Recommendation API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::models::recommendation::{QueryRequest, RecommendResponse};
use crate::state::AppState;

/// POST /recommend
///
/// Returns up to the configured maximum of assessments for a natural-language query.
/// Malformed bodies are reported as validation errors rather than axum's default 422.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let engine = state.engine()?;
    info!("Recommendation request ({} chars)", request.query.len());

    let recommended_assessments = engine.recommend(&request.query).await?;

    Ok(Json(RecommendResponse {
        recommended_assessments,
    }))
}
