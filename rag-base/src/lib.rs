//! Vector search over a Qdrant collection.
//!
//! Public API:
//! - [`VectorSearch`]: lazily built client and embedding singletons,
//!   `search_similar_texts` returning the joined top-k passages.
//! - [`NO_CONTEXT_FOUND`]: sentinel context returned when the search has no hits.

mod embedding;
mod vector_db;

pub mod errors {
    pub mod rag_base_error;
}

pub mod structs {
    pub mod rag_base_config;
    pub mod search_result;
}

use qdrant_client::Qdrant;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

pub use embedding::EmbeddingFunction;
pub use errors::rag_base_error::RagBaseError;
pub use structs::rag_base_config::{EmbeddingConfig, QdrantConfig, RagConfig};
pub use structs::search_result::SearchHit;

/// Context used when the collection has no match for the question.
pub const NO_CONTEXT_FOUND: &str = "No relevant context found.";

/// Similarity search facade owning the process-wide Qdrant client and
/// embedding function.
///
/// Both are created on first use, at most once, and shared afterwards.
pub struct VectorSearch {
    cfg: RagConfig,
    client: OnceCell<Qdrant>,
    embedder: OnceCell<EmbeddingFunction>,
}

impl VectorSearch {
    /// Validates and stores the config. Nothing is connected until the first search.
    pub fn new(cfg: RagConfig) -> Result<Self, RagBaseError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            client: OnceCell::new(),
            embedder: OnceCell::new(),
        })
    }

    /// Collection searched by [`Self::search_similar_texts`].
    pub fn collection(&self) -> &str {
        &self.cfg.qdrant.collection
    }

    /// Shared Qdrant client, built on first call.
    pub async fn client(&self) -> Result<&Qdrant, RagBaseError> {
        self.client
            .get_or_try_init(|| async {
                info!(url = %self.cfg.qdrant.url, "initializing Qdrant client");
                vector_db::connect(&self.cfg.qdrant)
            })
            .await
    }

    /// Shared embedding function, built on first call.
    pub async fn embedding_function(&self) -> Result<&EmbeddingFunction, RagBaseError> {
        self.embedder
            .get_or_try_init(|| async {
                info!(model = %self.cfg.embedding.model.model, "initializing embedding function");
                EmbeddingFunction::from_config(&self.cfg.embedding)
            })
            .await
    }

    /// Embeds `question`, fetches the `top_k` nearest passages and joins
    /// their text with newlines.
    ///
    /// Returns [`NO_CONTEXT_FOUND`] when nothing matches.
    ///
    /// # Errors
    /// Every failure is returned as [`RagBaseError::VectorSearch`].
    #[instrument(skip_all, fields(collection = %self.cfg.qdrant.collection, top_k = top_k))]
    pub async fn search_similar_texts(
        &self,
        question: &str,
        top_k: u64,
    ) -> Result<String, RagBaseError> {
        self.search_hits(question, top_k)
            .await
            .map(|hits| join_passages(&hits))
            .map_err(|e| {
                warn!(error = %e, "vector search failed");
                e.into_search_error()
            })
    }

    async fn search_hits(
        &self,
        question: &str,
        top_k: u64,
    ) -> Result<Vec<SearchHit>, RagBaseError> {
        let embedder = self.embedding_function().await?;
        let query_vec = embedder
            .encode_queries(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagBaseError::Qdrant("empty query embedding".into()))?;

        let client = self.client().await?;
        let hits = vector_db::search_top_k(client, &self.cfg.qdrant, query_vec, top_k).await?;

        debug!(hits = hits.len(), "vector search finished");
        Ok(hits)
    }
}

impl std::fmt::Debug for VectorSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearch")
            .field("collection", &self.cfg.qdrant.collection)
            .field("client_ready", &self.client.initialized())
            .field("embedder_ready", &self.embedder.initialized())
            .finish()
    }
}

/// Joins hit texts with `\n` in the given order, or returns the sentinel.
pub fn join_passages(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_CONTEXT_FOUND.to_string();
    }
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider};
    use axum::{Router, http::StatusCode, routing::post};

    fn config(embedding_endpoint: &str) -> RagConfig {
        RagConfig {
            qdrant: QdrantConfig::new("http://127.0.0.1:6334", "token"),
            embedding: EmbeddingConfig {
                model: LlmModelConfig {
                    provider: LlmProvider::Ollama,
                    model: "nomic-embed-text".into(),
                    endpoint: embedding_endpoint.into(),
                    api_key: None,
                    max_tokens: None,
                    temperature: Some(0.0),
                    top_p: None,
                    timeout_secs: Some(5),
                },
                dim: None,
            },
        }
    }

    fn hit(score: f32, text: &str) -> SearchHit {
        SearchHit {
            score,
            text: text.into(),
        }
    }

    #[test]
    fn joins_in_returned_order() {
        let hits = [
            hit(0.92, "Paris is the capital of France."),
            hit(0.81, "France is in Europe."),
        ];
        assert_eq!(
            join_passages(&hits),
            "Paris is the capital of France.\nFrance is in Europe."
        );
    }

    #[test]
    fn empty_hits_yield_sentinel() {
        assert_eq!(join_passages(&[]), NO_CONTEXT_FOUND);
    }

    #[tokio::test]
    async fn singletons_are_built_once() {
        let search = VectorSearch::new(config("http://127.0.0.1:11434")).unwrap();

        let (a, b) = tokio::join!(search.client(), search.client());
        assert!(std::ptr::eq(a.unwrap(), b.unwrap()));

        let first = search.embedding_function().await.unwrap();
        let second = search.embedding_function().await.unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[tokio::test]
    async fn embedding_failure_is_wrapped() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let search = VectorSearch::new(config(&format!("http://{addr}"))).unwrap();
        let err = search
            .search_similar_texts("What is the capital of France?", 3)
            .await
            .unwrap_err();

        assert!(matches!(err, RagBaseError::VectorSearch(_)));
        assert!(err.to_string().starts_with("error during vector search:"));
    }

    #[tokio::test]
    async fn invalid_embedding_config_is_wrapped() {
        let search = VectorSearch::new(config("not-a-url")).unwrap();
        let err = search.search_similar_texts("q", 1).await.unwrap_err();
        assert!(err.to_string().starts_with("error during vector search: embedding error:"));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = config("http://127.0.0.1:11434");
        cfg.qdrant.collection = "  ".into();
        assert!(matches!(
            VectorSearch::new(cfg),
            Err(RagBaseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn wrapping_is_idempotent() {
        let once = RagBaseError::Qdrant("down".into()).into_search_error();
        let twice = once.into_search_error();
        assert_eq!(twice.to_string(), "error during vector search: qdrant error: down");
    }
}
