//! Criteria Extractor: maps a free-text query to structured search intent via the LLM.
//!
//! Outcomes are explicit:
//! - `Err(AppError::Provider)`: the provider call failed. The request fails.
//! - `Ok(Extraction::Degraded)`: the provider answered but nothing usable came back.
//! - `Ok(Extraction::Criteria)`: at least one field is populated.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::recommendation::prompts::{criteria_system, CRITERIA_PROMPT_TEMPLATE};

/// Structured intent extracted from a query. Produced per request, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub job_role: Option<String>,
    pub candidate_level: Option<String>,
    pub key_skills_or_concepts: Option<Vec<String>>,
}

impl SearchCriteria {
    /// True when no field carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        blank(&self.job_role)
            && blank(&self.candidate_level)
            && self
                .key_skills_or_concepts
                .as_deref()
                .map_or(true, |skills| skills.iter().all(|s| s.trim().is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Criteria(SearchCriteria),
    /// Extraction ran but produced nothing usable. Search falls back to the raw query.
    Degraded,
}

#[async_trait]
pub trait CriteriaExtractor: Send + Sync {
    async fn extract(&self, query: &str) -> Result<Extraction, AppError>;
}

/// Production extractor backed by `LlmClient`.
pub struct LlmCriteriaExtractor {
    llm: LlmClient,
    system: String,
}

impl LlmCriteriaExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            system: criteria_system(),
        }
    }
}

#[async_trait]
impl CriteriaExtractor for LlmCriteriaExtractor {
    async fn extract(&self, query: &str) -> Result<Extraction, AppError> {
        let prompt = CRITERIA_PROMPT_TEMPLATE.replace("{original_query}", query);
        match self.llm.call_json::<Value>(&prompt, &self.system).await {
            Ok(value) => Ok(interpret_extraction(&value)),
            Err(e) if e.is_shape_failure() => {
                warn!("Criteria extraction returned unusable output: {e}");
                Ok(Extraction::Degraded)
            }
            Err(e) => Err(AppError::Provider(format!("Criteria extraction failed: {e}"))),
        }
    }
}

/// Reads each field independently so one malformed field does not discard the others.
pub fn interpret_extraction(value: &Value) -> Extraction {
    let Some(object) = value.as_object() else {
        debug!("Extraction output is not a JSON object");
        return Extraction::Degraded;
    };

    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let skills = object
        .get("key_skills_or_concepts")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .filter(|skills| !skills.is_empty());

    let criteria = SearchCriteria {
        job_role: text("job_role"),
        candidate_level: text("candidate_level"),
        key_skills_or_concepts: skills,
    };

    if criteria.is_empty() {
        Extraction::Degraded
    } else {
        Extraction::Criteria(criteria)
    }
}
