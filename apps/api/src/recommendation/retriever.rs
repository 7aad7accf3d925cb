//! Retriever: nearest-neighbor search over precomputed catalog embeddings.
//!
//! `Retriever` is the seam the assembler depends on. `EmbeddingRetriever` embeds
//! the query through an `EmbeddingProvider` and scans a `FlatIndex` built once
//! from the catalog snapshot at startup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::catalog::IndexDocument;
use crate::embeddings::{EmbeddingError, EmbeddingProvider, InputKind};
use crate::errors::AppError;
use crate::recommendation::index::FlatIndex;

/// One retrieval hit. Rank is the position in the returned sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    /// Catalog row this hit points at. `None` when the backend lost the metadata.
    pub row_index: Option<usize>,
    /// Backend similarity. Logged only; callers order by position.
    pub similarity: f32,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Most-similar first. An empty result is valid.
    async fn retrieve(&self, query_text: &str) -> Result<Vec<CandidateMatch>, AppError>;
}

pub struct EmbeddingRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: FlatIndex,
    k: usize,
}

impl EmbeddingRetriever {
    /// Embeds every document and builds the index. Runs once at startup.
    pub async fn build(
        embedder: Arc<dyn EmbeddingProvider>,
        documents: &[IndexDocument],
        k: usize,
    ) -> anyhow::Result<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let row_indices: Vec<usize> = documents.iter().map(|d| d.row_index).collect();

        let vectors = embedder.embed(&texts, InputKind::Document).await?;
        let index = FlatIndex::build(&row_indices, vectors)?;
        info!("Vector index built with {} entries (k={})", index.len(), k);

        Ok(Self { embedder, index, k })
    }
}

#[async_trait]
impl Retriever for EmbeddingRetriever {
    async fn retrieve(&self, query_text: &str) -> Result<Vec<CandidateMatch>, AppError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query = [query_text.to_string()];
        let mut vectors = self
            .embedder
            .embed(&query, InputKind::Query)
            .await
            .map_err(provider_error)?;
        let query_vector = vectors.pop().ok_or_else(|| {
            provider_error(EmbeddingError::CountMismatch {
                requested: 1,
                returned: 0,
            })
        })?;

        let hits = self.index.search(&query_vector, self.k);
        debug!("Retrieved {} candidates", hits.len());

        Ok(hits
            .into_iter()
            .map(|(row_index, similarity)| CandidateMatch {
                row_index: Some(row_index),
                similarity,
            })
            .collect())
    }
}

fn provider_error(e: EmbeddingError) -> AppError {
    AppError::Provider(format!("Retrieval failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as keyword-presence vectors over a fixed vocabulary.
    struct KeywordEmbedder {
        vocabulary: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(
            &self,
            texts: &[String],
            _kind: InputKind,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    self.vocabulary
                        .iter()
                        .map(|w| if lower.contains(w) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(
            &self,
            _texts: &[String],
            _kind: InputKind,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 401,
                message: "invalid api token".to_string(),
            })
        }
    }

    fn docs(texts: &[&str]) -> Vec<IndexDocument> {
        texts
            .iter()
            .enumerate()
            .map(|(row_index, text)| IndexDocument {
                row_index,
                text: text.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_retrieve_ranks_closest_first() {
        let embedder = Arc::new(KeywordEmbedder {
            vocabulary: vec!["java", "sales", "personality"],
            calls: AtomicUsize::new(0),
        });
        let retriever = EmbeddingRetriever::build(
            embedder.clone(),
            &docs(&["Sales Interview", "Java 8 (New)", "Personality questionnaire"]),
            20,
        )
        .await
        .unwrap();

        let hits = retriever.retrieve("assessment for Java developer").await.unwrap();
        assert_eq!(hits[0].row_index, Some(1));
        assert_eq!(hits.len(), 3);
        // One call for the catalog, one for the query.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retrieve_caps_at_k() {
        let embedder = Arc::new(KeywordEmbedder {
            vocabulary: vec!["a"],
            calls: AtomicUsize::new(0),
        });
        let retriever = EmbeddingRetriever::build(embedder, &docs(&["a", "a", "a", "a"]), 2)
            .await
            .unwrap();
        assert_eq!(retriever.retrieve("a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let embedder = Arc::new(KeywordEmbedder {
            vocabulary: vec!["a"],
            calls: AtomicUsize::new(0),
        });
        let retriever = EmbeddingRetriever::build(embedder.clone(), &[], 20).await.unwrap();
        assert!(retriever.retrieve("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_embedding_failure_is_provider_error() {
        let retriever = EmbeddingRetriever {
            embedder: Arc::new(FailingEmbedder),
            index: FlatIndex::build(&[0], vec![vec![1.0]]).unwrap(),
            k: 20,
        };
        let err = retriever.retrieve("Java").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }

    #[tokio::test]
    async fn test_build_fails_when_catalog_embedding_fails() {
        let result = EmbeddingRetriever::build(Arc::new(FailingEmbedder), &docs(&["x"]), 20).await;
        assert!(result.is_err());
    }
}
