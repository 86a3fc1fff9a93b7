//! Default model configs loaded strictly from environment variables.
//!
//! Two roles are used by the service:
//!
//! - **Chat**      → the answer model behind an OpenAI-compatible API (OpenRouter by default)
//! - **Embedding** → the query encoder (Ollama or OpenAI-compatible)
//!
//! # Environment variables
//!
//! Chat:
//! - `OPENROUTER_API_KEY` = API key (mandatory)
//! - `LLM_BASE_URL`       = API base (default `https://openrouter.ai/api/v1`)
//! - `LLM_MODEL`          = model id (default `meta-llama/llama-3.2-1b-instruct`)
//! - `LLM_MAX_TOKENS`     = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`   = request timeout (default 60)
//!
//! Embedding:
//! - `EMBEDDING_PROVIDER`     = `ollama` | `openai` (default `ollama`)
//! - `EMBEDDING_URL`          = endpoint (default `http://localhost:11434`)
//! - `EMBEDDING_MODEL`        = model id (default `nomic-embed-text`)
//! - `EMBEDDING_API_KEY`      = optional bearer key (required for `openai`)
//! - `EMBEDDING_TIMEOUT_SECS` = request timeout (default 30)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_or, env_u64_or, must_env,
        validate_http_endpoint,
    },
};

pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_MODEL: &str = "meta-llama/llama-3.2-1b-instruct";
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Constructs the config for the **chat** model used to answer questions.
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `OPENROUTER_API_KEY` is absent or blank
/// - [`ConfigError::InvalidFormat`] if `LLM_BASE_URL` is not http(s)
/// - [`ConfigError::InvalidNumber`] for malformed numeric variables
pub fn config_openrouter_chat() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("OPENROUTER_API_KEY")?;
    let endpoint = env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL);
    validate_http_endpoint("LLM_BASE_URL", &endpoint)?;
    let model = env_or("LLM_MODEL", DEFAULT_LLM_MODEL);
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_u64_or("LLM_TIMEOUT_SECS", 60)?;

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: None,
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the config for the **embedding** model used to encode queries.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for unknown `EMBEDDING_PROVIDER`
/// - [`ConfigError::MissingVar`] if the `openai` provider has no `EMBEDDING_API_KEY`
/// - [`ConfigError::InvalidFormat`] if `EMBEDDING_URL` is not http(s)
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let raw_provider = env_or("EMBEDDING_PROVIDER", "ollama");
    let provider = LlmProvider::parse(&raw_provider)
        .ok_or(ConfigError::UnsupportedProvider(raw_provider))?;

    let endpoint = env_or("EMBEDDING_URL", DEFAULT_EMBEDDING_URL);
    validate_http_endpoint("EMBEDDING_URL", &endpoint)?;

    let api_key = match provider {
        LlmProvider::OpenAI => Some(must_env("EMBEDDING_API_KEY")?),
        LlmProvider::Ollama => std::env::var("EMBEDDING_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty()),
    };

    Ok(LlmModelConfig {
        provider,
        model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(env_u64_or("EMBEDDING_TIMEOUT_SECS", 30)?),
    })
}
