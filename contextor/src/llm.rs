//! Generation seam: the chat model answering the built prompt.

use std::future::Future;

use ai_llm_service::AiLlmError;
use ai_llm_service::services::open_ai_service::OpenAiService;

/// Chat model used to answer prompts.
pub trait AnswerGenerator: Send + Sync {
    /// Model identifier, for logs and health output.
    fn model(&self) -> &str;

    /// Sends `(system, user)` and returns the assistant's text.
    fn generate_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;

    /// Cheap liveness probe of the provider.
    fn check_connection(&self) -> impl Future<Output = Result<bool, AiLlmError>> + Send;
}

impl AnswerGenerator for OpenAiService {
    fn model(&self) -> &str {
        OpenAiService::model(self)
    }

    fn generate_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send {
        OpenAiService::generate_response(self, system_prompt, user_prompt)
    }

    fn check_connection(&self) -> impl Future<Output = Result<bool, AiLlmError>> + Send {
        OpenAiService::check_connection(self)
    }
}
