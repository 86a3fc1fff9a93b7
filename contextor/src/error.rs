//! Typed error for the contextor crate.

use std::fmt;

use ai_llm_service::AiLlmError;
use rag_base::RagBaseError;
use thiserror::Error;

/// Pipeline failure tagged by the stage that produced it.
///
/// Display is transparent, so callers see the underlying message
/// (e.g. `error during vector search: ...`).
#[derive(Debug, Error)]
pub enum ContextorError {
    /// Context retrieval (embedding or vector search) failed.
    #[error(transparent)]
    Retrieval(#[from] RagBaseError),

    /// The LLM call failed.
    #[error(transparent)]
    Generation(#[from] AiLlmError),
}

impl ContextorError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ContextorError::Retrieval(_) => FailureKind::Retrieval,
            ContextorError::Generation(_) => FailureKind::Generation,
        }
    }
}

/// Stage at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Retrieval,
    Generation,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Retrieval => "context_retrieval",
            FailureKind::Generation => "response_generation",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
