//! Configuration layer: reads runtime settings from environment variables
//! and exposes strongly typed configs for Qdrant search and query embeddings.

use ai_llm_service::{LlmModelConfig, config::default_config::config_embedding};

use crate::errors::rag_base_error::RagBaseError;

/// Default collection queried for context. Not request-controllable.
pub const DEFAULT_COLLECTION: &str = "my_rag_collection";

/// Qdrant connectivity, collection, and search-tuning parameters.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// gRPC URL for Qdrant (e.g., "https://xyz.cloud.qdrant.io:6334").
    pub url: String,
    /// Access token sent as the `api-key` header.
    pub api_key: String,
    /// Collection holding the passages; expected to use `Dot` distance.
    pub collection: String,
    /// HNSW search breadth (`ef`); larger is more accurate and slower.
    pub hnsw_ef: u64,
    /// Bypass the HNSW index and scan exhaustively.
    pub exact: bool,
    /// Per-call timeout for Qdrant requests.
    pub timeout_secs: u64,
}

impl QdrantConfig {
    /// Config with default collection and search parameters.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            hnsw_ef: 64,
            exact: false,
            timeout_secs: 30,
        }
    }
}

/// Query-embedding configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Provider, endpoint and model used to encode queries.
    pub model: LlmModelConfig,
    /// Expected vector length; checked on every query when set.
    pub dim: Option<usize>,
}

/// Top-level runtime configuration for vector search.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Qdrant connectivity & collection settings.
    pub qdrant: QdrantConfig,
    /// Query-embedding settings.
    pub embedding: EmbeddingConfig,
}

impl RagConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (required)
    /// - `QDRANT_API_KEY` (required)
    /// - `QDRANT_COLLECTION` (default: "my_rag_collection")
    /// - `QDRANT_HNSW_EF` (default: 64)
    /// - `QDRANT_EXACT` (default: false)
    /// - `QDRANT_TIMEOUT_SECS` (default: 30)
    /// - `EMBEDDING_DIM` (optional)
    /// - embedding provider variables, see [`config_embedding`]
    pub fn from_env() -> Result<Self, RagBaseError> {
        let mut qdrant = QdrantConfig::new(
            read_required_env("QDRANT_URL")?,
            read_required_env("QDRANT_API_KEY")?,
        );

        if let Some(collection) = read_opt_env("QDRANT_COLLECTION") {
            qdrant.collection = collection;
        }
        if let Some(ef) = read_parsed_env::<u64>("QDRANT_HNSW_EF")? {
            qdrant.hnsw_ef = ef;
        }
        if let Some(exact) = read_parsed_env::<bool>("QDRANT_EXACT")? {
            qdrant.exact = exact;
        }
        if let Some(secs) = read_parsed_env::<u64>("QDRANT_TIMEOUT_SECS")? {
            qdrant.timeout_secs = secs;
        }

        let embedding = EmbeddingConfig {
            model: config_embedding()?,
            dim: read_parsed_env::<usize>("EMBEDDING_DIM")?,
        };

        let cfg = Self { qdrant, embedding };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    ///
    /// `QDRANT_URL` must be an http(s) URI the client accepts; the check
    /// builds a throwaway client, which performs no network I/O.
    pub fn validate(&self) -> Result<(), RagBaseError> {
        let url = self.qdrant.url.trim();
        if url.is_empty() {
            return Err(RagBaseError::InvalidConfig("QDRANT_URL is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RagBaseError::InvalidConfig(format!(
                "QDRANT_URL must start with http:// or https://, got '{url}'"
            )));
        }
        if let Err(e) = crate::vector_db::connect(&self.qdrant) {
            return Err(RagBaseError::InvalidConfig(format!("QDRANT_URL: {e}")));
        }
        if self.qdrant.api_key.trim().is_empty() {
            return Err(RagBaseError::InvalidConfig("QDRANT_API_KEY is empty".into()));
        }
        if self.qdrant.collection.trim().is_empty() {
            return Err(RagBaseError::InvalidConfig("QDRANT_COLLECTION is empty".into()));
        }
        if self.qdrant.hnsw_ef == 0 {
            return Err(RagBaseError::InvalidConfig("QDRANT_HNSW_EF must be > 0".into()));
        }
        if self.qdrant.timeout_secs == 0 {
            return Err(RagBaseError::InvalidConfig("QDRANT_TIMEOUT_SECS must be > 0".into()));
        }
        if self.embedding.dim == Some(0) {
            return Err(RagBaseError::InvalidConfig("EMBEDDING_DIM must be > 0".into()));
        }
        Ok(())
    }
}

/// Read a required, non-blank variable.
fn read_required_env(key: &str) -> Result<String, RagBaseError> {
    read_opt_env(key).ok_or_else(|| RagBaseError::EnvMissing { key: key.into() })
}

/// Read an optional variable; blank counts as unset.
fn read_opt_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse an optional variable, with error mapped to `RagBaseError`.
fn read_parsed_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, RagBaseError> {
    match read_opt_env(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RagBaseError::EnvParse {
                key: key.into(),
                value: v,
            }),
        None => Ok(None),
    }
}
