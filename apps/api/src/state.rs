use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::errors::AppError;
use crate::recommendation::assembler::RecommendationEngine;

/// Where startup currently stands.
pub enum Readiness<'a> {
    Initializing,
    Ready(&'a Arc<RecommendationEngine>),
    Failed(&'a str),
}

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The engine slot is written exactly once, by the startup task. Handlers only read it,
/// so requests arriving before startup completes see a distinct "not initialized" state
/// instead of partially built collaborators.
#[derive(Clone, Default)]
pub struct AppState {
    engine: Arc<OnceLock<Result<Arc<RecommendationEngine>, String>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the startup outcome. Later calls are ignored.
    pub fn publish(&self, outcome: Result<RecommendationEngine, String>) {
        if self.engine.set(outcome.map(Arc::new)).is_err() {
            warn!("Startup outcome already published; ignoring second publish");
        }
    }

    pub fn readiness(&self) -> Readiness<'_> {
        match self.engine.get() {
            None => Readiness::Initializing,
            Some(Ok(engine)) => Readiness::Ready(engine),
            Some(Err(reason)) => Readiness::Failed(reason),
        }
    }

    /// The engine, or `AppError::Configuration` when startup has not succeeded.
    pub fn engine(&self) -> Result<Arc<RecommendationEngine>, AppError> {
        match self.readiness() {
            Readiness::Ready(engine) => Ok(Arc::clone(engine)),
            Readiness::Initializing => Err(AppError::Configuration(
                "Recommendation engine is still initializing".to_string(),
            )),
            Readiness::Failed(reason) => Err(AppError::Configuration(format!(
                "Recommendation engine failed to initialize: {reason}"
            ))),
        }
    }
}
