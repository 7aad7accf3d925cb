// Recommendation pipeline: criteria extraction, query rewriting, retrieval,
// field coercion, and assembly of the final ranked list.
// All LLM calls go through llm_client; all embedding calls go through embeddings.

pub mod assembler;
pub mod coercion;
pub mod criteria;
pub mod handlers;
pub mod index;
pub mod prompts;
pub mod retriever;
pub mod rewriter;
