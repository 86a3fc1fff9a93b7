//! Unified error type for the rag-base crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Errors produced by the RAG base module.
#[derive(Debug, Error)]
pub enum RagBaseError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Required environment variable is missing.
    #[error("missing env variable: {key}")]
    EnvMissing { key: String },

    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Qdrant client / transport ───────────────────────────────────────────
    /// Transport / client error from Qdrant.
    #[error("qdrant error: {0}")]
    Qdrant(String),

    // ── Embeddings backend ──────────────────────────────────────────────────
    /// Embedding backend failed to initialize or to embed inputs.
    #[error("embedding error: {0}")]
    Embedding(#[from] AiLlmError),

    /// The embedding backend returned a vector of unexpected length.
    #[error("embedding dim {got} != expected {want}")]
    EmbeddingDim { got: usize, want: usize },

    // ── Search boundary ─────────────────────────────────────────────────────
    /// Any failure while answering a similarity query, with the cause attached.
    #[error("error during vector search: {0}")]
    VectorSearch(#[source] Box<RagBaseError>),
}

impl RagBaseError {
    /// Wraps `self` as a search-boundary failure (idempotent).
    pub fn into_search_error(self) -> Self {
        match self {
            e @ RagBaseError::VectorSearch(_) => e,
            other => RagBaseError::VectorSearch(Box::new(other)),
        }
    }
}
