use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::{AppState, Readiness};

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Assessment Recommender API. POST a query to /recommend."
    }))
}

/// GET /health
/// Reports whether the recommendation engine is ready, and why not when it isn't.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let details = match state.readiness() {
        Readiness::Ready(engine) if engine.catalog().is_empty() => {
            Some("Catalog not loaded or empty".to_string())
        }
        Readiness::Ready(_) => None,
        Readiness::Initializing => {
            Some("Retriever not initialized, Analysis chain not initialized".to_string())
        }
        Readiness::Failed(reason) => Some(format!("Initialization failed: {reason}")),
    };

    match details {
        None => Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Some(details) => Json(json!({
            "status": "unhealthy",
            "version": env!("CARGO_PKG_VERSION"),
            "details": details,
        })),
    }
}
