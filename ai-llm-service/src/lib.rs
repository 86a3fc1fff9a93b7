//! Model clients shared by the RAG backend.
//!
//! - [`services::open_ai_service::OpenAiService`]: chat completions, batched
//!   embeddings, and a `/models` liveness probe against any OpenAI-compatible API
//!   (OpenRouter by default).
//! - [`services::ollama_service::OllamaService`]: embeddings from a local Ollama.
//!
//! Configuration comes from [`config::default_config`]; every failure is an
//! [`error_handler::AiLlmError`].

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod error_handler;

pub mod services {
    pub mod ollama_service;
    pub mod open_ai_service;
}

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
