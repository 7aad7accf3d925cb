use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::recommendation::rewriter::RewriteWeights;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub cohere_api_key: String,
    pub catalog_csv_path: PathBuf,
    pub llm_base_url: String,
    pub llm_model: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    /// Candidates requested from the retriever per query.
    pub num_docs_to_retrieve: usize,
    /// Maximum assessments returned to the caller.
    pub num_docs_to_return: usize,
    pub rewrite_weights: RewriteWeights,
    /// Attempts per provider call (LLM and embeddings), including the first.
    pub provider_max_retries: u32,
    pub request_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let num_docs_to_retrieve = parse_env("NUM_DOCS_TO_RETRIEVE", 20usize)?;
        let num_docs_to_return = parse_env("NUM_DOCS_TO_RETURN", 10usize)?;
        anyhow::ensure!(
            num_docs_to_retrieve > 0,
            "NUM_DOCS_TO_RETRIEVE must be greater than zero"
        );
        anyhow::ensure!(
            num_docs_to_return > 0,
            "NUM_DOCS_TO_RETURN must be greater than zero"
        );

        let defaults = RewriteWeights::default();

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            cohere_api_key: require_env("COHERE_API_KEY")?,
            catalog_csv_path: PathBuf::from(env_or("CATALOG_CSV_PATH", "shlproducts.csv")),
            llm_base_url: env_or("LLM_BASE_URL", "https://api.groq.com/openai/v1"),
            llm_model: env_or("LLM_MODEL", "llama3-8b-8192"),
            embedding_base_url: env_or("EMBEDDING_BASE_URL", "https://api.cohere.ai/v1"),
            embedding_model: env_or("EMBEDDING_MODEL", "embed-english-v3.0"),
            num_docs_to_retrieve,
            num_docs_to_return,
            rewrite_weights: RewriteWeights {
                job_role: parse_env("JOB_ROLE_REPETITION", defaults.job_role)?,
                candidate_level: parse_env("CANDIDATE_LEVEL_REPETITION", defaults.candidate_level)?,
                skill: parse_env("SKILL_REPETITION", defaults.skill)?,
            },
            provider_max_retries: parse_env("PROVIDER_MAX_RETRIES", 3u32)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 60u64)?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
