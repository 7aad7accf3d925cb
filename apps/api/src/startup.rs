//! One-time initialization: catalog load, index build, extractor wiring.
//!
//! Runs in a background task after the listener is bound. The outcome is
//! published to `AppState` exactly once.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::catalog::{load_catalog, mapping::describe_mapping};
use crate::config::Config;
use crate::embeddings::CohereEmbedder;
use crate::llm_client::LlmClient;
use crate::recommendation::assembler::RecommendationEngine;
use crate::recommendation::criteria::LlmCriteriaExtractor;
use crate::recommendation::retriever::EmbeddingRetriever;
use crate::state::AppState;

/// Builds every collaborator and the engine. Fails on the first error.
pub async fn initialize(config: &Config) -> Result<RecommendationEngine> {
    info!("Catalog column mapping: {}", describe_mapping());

    // Blocking file read; keep it off the async workers.
    let path = config.catalog_csv_path.clone();
    let catalog = tokio::task::spawn_blocking(move || load_catalog(&path))
        .await
        .context("catalog loading task panicked")??;
    anyhow::ensure!(!catalog.is_empty(), "catalog contains no assessments");
    info!("Catalog loaded: {} assessments", catalog.len());
    let catalog = Arc::new(catalog);

    let embedder = CohereEmbedder::new(
        config.cohere_api_key.clone(),
        &config.embedding_base_url,
        config.embedding_model.clone(),
    )?
    .with_max_retries(config.provider_max_retries);
    info!("Embedding client initialized (model: {})", embedder.model());

    let documents = catalog.index_documents();
    let retriever = EmbeddingRetriever::build(
        Arc::new(embedder),
        &documents,
        config.num_docs_to_retrieve,
    )
    .await
    .context("failed to build vector index")?;

    let llm = LlmClient::new(
        config.groq_api_key.clone(),
        &config.llm_base_url,
        config.llm_model.clone(),
    )?
    .with_max_retries(config.provider_max_retries);
    info!("LLM client initialized (model: {})", llm.model());

    let engine = RecommendationEngine::builder()
        .catalog(catalog)
        .retriever(Arc::new(retriever))
        .extractor(Arc::new(LlmCriteriaExtractor::new(llm)))
        .weights(config.rewrite_weights)
        .max_results(config.num_docs_to_return)
        .build()?;

    Ok(engine)
}

/// Spawns `initialize` and publishes its outcome to `state`.
pub fn spawn_initialization(state: AppState, config: Config) {
    tokio::spawn(async move {
        match initialize(&config).await {
            Ok(engine) => {
                info!("Recommendation engine ready");
                state.publish(Ok(engine));
            }
            Err(e) => {
                error!("Startup initialization failed: {e:#}");
                state.publish(Err(format!("{e:#}")));
            }
        }
    });
}
