//! Query embedding function with provider enum dispatch.

use ai_llm_service::{
    LlmProvider,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};
use tracing::debug;

use crate::errors::rag_base_error::RagBaseError;
use crate::structs::rag_base_config::EmbeddingConfig;

/// Concrete embedding backend.
#[derive(Debug)]
enum EmbeddingBackend {
    Ollama(OllamaService),
    OpenAi(OpenAiService),
}

/// Encodes questions into query vectors.
///
/// Built once per process and reused; holds its own HTTP client.
#[derive(Debug)]
pub struct EmbeddingFunction {
    backend: EmbeddingBackend,
    expected_dim: Option<usize>,
}

impl EmbeddingFunction {
    /// Builds the backend selected by `cfg.model.provider`. No network I/O.
    pub fn from_config(cfg: &EmbeddingConfig) -> Result<Self, RagBaseError> {
        let backend = match cfg.model.provider {
            LlmProvider::Ollama => EmbeddingBackend::Ollama(OllamaService::new(cfg.model.clone())?),
            LlmProvider::OpenAI => EmbeddingBackend::OpenAi(OpenAiService::new(cfg.model.clone())?),
        };

        debug!(
            provider = ?cfg.model.provider,
            model = %cfg.model.model,
            expected_dim = ?cfg.dim,
            "embedding function created"
        );

        Ok(Self {
            backend,
            expected_dim: cfg.dim,
        })
    }

    /// Returns one query vector per input, in input order.
    ///
    /// # Errors
    /// - `Embedding` on backend failures
    /// - `EmbeddingDim` when a vector length differs from the configured dimension
    pub async fn encode_queries(&self, queries: &[String]) -> Result<Vec<Vec<f32>>, RagBaseError> {
        let vectors = match &self.backend {
            EmbeddingBackend::Ollama(svc) => svc.embeddings(queries).await?,
            EmbeddingBackend::OpenAi(svc) => svc.embeddings(queries).await?,
        };

        if let Some(want) = self.expected_dim {
            if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
                return Err(RagBaseError::EmbeddingDim {
                    got: bad.len(),
                    want,
                });
            }
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::LlmModelConfig;
    use axum::{Json, Router, routing::post};
    use serde_json::json;

    async fn serve_fixed_embedding(vector: Vec<f32>) -> String {
        let app = Router::new().route(
            "/api/embeddings",
            post(move || {
                let vector = vector.clone();
                async move { Json(json!({ "embedding": vector })) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn cfg(endpoint: &str, dim: Option<usize>) -> EmbeddingConfig {
        EmbeddingConfig {
            model: LlmModelConfig {
                provider: LlmProvider::Ollama,
                model: "nomic-embed-text".into(),
                endpoint: endpoint.into(),
                api_key: None,
                max_tokens: None,
                temperature: Some(0.0),
                top_p: None,
                timeout_secs: Some(5),
            },
            dim,
        }
    }

    #[tokio::test]
    async fn encodes_with_matching_dimension() {
        let base = serve_fixed_embedding(vec![0.1, 0.2, 0.3]).await;
        let f = EmbeddingFunction::from_config(&cfg(&base, Some(3))).unwrap();

        let out = f.encode_queries(&["question".into()]).await.unwrap();
        assert_eq!(out, vec![vec![0.1, 0.2, 0.3]]);
    }

    #[tokio::test]
    async fn rejects_unexpected_dimension() {
        let base = serve_fixed_embedding(vec![0.1, 0.2]).await;
        let f = EmbeddingFunction::from_config(&cfg(&base, Some(3))).unwrap();

        let err = f.encode_queries(&["question".into()]).await.unwrap_err();
        assert!(matches!(err, RagBaseError::EmbeddingDim { got: 2, want: 3 }));
    }

    #[test]
    fn openai_backend_requires_key() {
        let mut c = cfg("https://api.openai.com/v1", None);
        c.model.provider = LlmProvider::OpenAI;
        assert!(matches!(
            EmbeddingFunction::from_config(&c),
            Err(RagBaseError::Embedding(_))
        ));
    }
}
