//! Cohere-based embedding client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EmbeddingError, EmbeddingProvider, InputKind};

/// Cohere rejects more than 96 texts per request.
pub const MAX_BATCH_SIZE: usize = 96;
const DEFAULT_MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Async embeddings client for the Cohere `/embed` endpoint.
#[derive(Clone)]
pub struct CohereEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    batch_size: usize,
    max_retries: u32,
}

impl CohereEmbedder {
    pub fn new(api_key: String, base_url: &str, model: String) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embed", base_url.trim_end_matches('/')),
            api_key,
            model,
            batch_size: MAX_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Overrides the number of attempts made per batch (minimum 1).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one batch and returns its vectors, retrying on 429/5xx and transport errors.
    async fn embed_batch(
        &self,
        texts: &[String],
        kind: InputKind,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            texts,
            input_type: kind.as_str(),
            truncate: "END",
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = retry_backoff(attempt);
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: EmbedResponse = response.json().await?;
            if parsed.embeddings.len() != texts.len() {
                return Err(EmbeddingError::CountMismatch {
                    requested: texts.len(),
                    returned: parsed.embeddings.len(),
                });
            }
            return Ok(parsed.embeddings);
        }

        Err(last_error.unwrap_or(EmbeddingError::RateLimited {
            retries: self.max_retries,
        }))
    }
}

#[async_trait]
impl EmbeddingProvider for CohereEmbedder {
    async fn embed(
        &self,
        texts: &[String],
        kind: InputKind,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!(
                "Embedding batch {} ({} texts, {})",
                batch_no,
                batch.len(),
                kind.as_str()
            );
            vectors.extend(self.embed_batch(batch, kind).await?);
        }
        Ok(vectors)
    }
}

fn retry_backoff(attempt: u32) -> Duration {
    let capped = attempt.min(5);
    Duration::from_millis(500 * (1 << capped))
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: &'a str,
    truncate: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}
