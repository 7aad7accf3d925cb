//! Embedding provider seam.
//!
//! Catalog text and queries are embedded through `EmbeddingProvider`; the
//! production backend is `CohereEmbedder`. Tests swap in deterministic fakes.

use async_trait::async_trait;
use thiserror::Error;

pub mod cohere;

pub use cohere::CohereEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned {returned} embeddings for {requested} inputs")]
    CountMismatch { requested: usize, returned: usize },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// What the text is used for. Asymmetric models embed documents and queries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Document,
    Query,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Document => "search_document",
            InputKind::Query => "search_query",
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `texts` in order. The output has exactly one vector per input.
    async fn embed(&self, texts: &[String], kind: InputKind)
        -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
