//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::{Deserialize, Serialize};

use crate::metrics::{ResourceReport, StageTimings};
use crate::prompt::DEFAULT_ASSISTANT_PROMPT;

/// One question to answer with retrieved context.
///
/// # Example
/// ```
/// use contextor::AskInput;
/// let input = AskInput::new("What is the capital of France?");
/// assert_eq!(input.top_k, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AskInput {
    pub question: String,
    /// System message sent ahead of the RAG prompt.
    pub system_prompt: String,
    /// Number of passages to retrieve; callers validate `>= 1`.
    pub top_k: u64,
}

impl AskInput {
    pub const DEFAULT_TOP_K: u64 = 3;

    /// Input with the default system prompt and `top_k`.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            system_prompt: DEFAULT_ASSISTANT_PROMPT.to_string(),
            top_k: Self::DEFAULT_TOP_K,
        }
    }
}

/// Answer plus optional diagnostics for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AskOutcome {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<StageTimings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceReport>,
}
