//! Process configuration and the shared handler state.

use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, LlmModelConfig, config::default_config::config_openrouter_chat,
    services::open_ai_service::OpenAiService,
};
use contextor::{AnswerGenerator, ContextRetriever, RagPipeline};
use rag_base::{RagBaseError, RagConfig, VectorSearch};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";

/// Startup configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LLM configuration: {0}")]
    Llm(#[from] AiLlmError),

    #[error("vector search configuration: {0}")]
    Rag(#[from] RagBaseError),

    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, `API_ADDRESS`.
    pub address: String,
    /// Chat model behind `/ask`.
    pub llm: LlmModelConfig,
    /// Qdrant and query-embedding settings.
    pub rag: RagConfig,
    /// `ASK_INCLUDE_METRICS`: attach timing/resources to `/ask` responses.
    pub include_metrics: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing secrets (`OPENROUTER_API_KEY`, `QDRANT_URL`, `QDRANT_API_KEY`)
    /// are reported here so the process never starts half-configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let address = std::env::var("API_ADDRESS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

        let include_metrics = match std::env::var("ASK_INCLUDE_METRICS") {
            Ok(raw) if !raw.trim().is_empty() => parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                var: "ASK_INCLUDE_METRICS",
                value: raw,
            })?,
            _ => true,
        };

        Ok(Self {
            address,
            llm: config_openrouter_chat()?,
            rag: RagConfig::from_env()?,
            include_metrics,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState<R, G> {
    pub pipeline: Arc<RagPipeline<R, G>>,
}

impl<R, G> Clone for AppState<R, G> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<R, G> AppState<R, G>
where
    R: ContextRetriever,
    G: AnswerGenerator,
{
    pub fn new(pipeline: RagPipeline<R, G>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl AppState<VectorSearch, OpenAiService> {
    /// Builds the production clients. No network I/O happens here.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let search = VectorSearch::new(cfg.rag.clone())?;
        let llm = OpenAiService::new(cfg.llm.clone())?;

        info!(
            model = %cfg.llm.model,
            collection = search.collection(),
            include_metrics = cfg.include_metrics,
            "application state ready"
        );

        Ok(Self::new(RagPipeline::new(search, llm, cfg.include_metrics)))
    }
}
