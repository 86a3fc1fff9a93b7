use contextor::{AskInput, prompt::DEFAULT_ASSISTANT_PROMPT};
use serde::Deserialize;

use crate::error_handler::AppError;

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// System message for the model.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Number of passages to retrieve; must be at least 1.
    #[serde(default = "default_top_k")]
    pub top_k: u64,
}

fn default_system_prompt() -> String {
    DEFAULT_ASSISTANT_PROMPT.to_string()
}

fn default_top_k() -> u64 {
    AskInput::DEFAULT_TOP_K
}

impl AskRequest {
    /// Checks field constraints and converts into pipeline input.
    pub fn validate(self) -> Result<AskInput, AppError> {
        if self.top_k == 0 {
            return Err(AppError::Unprocessable("top_k must be >= 1".into()));
        }
        Ok(AskInput {
            question: self.question,
            system_prompt: self.system_prompt,
            top_k: self.top_k,
        })
    }
}
