//! HTTP surface of the RAG service.
//!
//! - [`router`] wires the routes over any retriever/generator pair.
//! - [`start`] builds the production clients and serves until Ctrl+C.

pub mod core {
    pub mod app_state;
}

pub mod error_handler;

pub mod middleware_layer {
    pub mod request_id;
}

pub mod routes {
    pub mod root_route;

    pub mod ask {
        pub mod ask_question_route;
        pub mod ask_request;
    }

    pub mod health {
        pub mod health_route;
    }
}

use axum::{
    Router, middleware,
    routing::{get, post},
};
use contextor::{AnswerGenerator, ContextRetriever};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::{AppConfig, AppState, ConfigError};
pub use crate::error_handler::AppError;

use crate::{
    middleware_layer::request_id::request_id,
    routes::{
        ask::ask_question_route::ask_question,
        health::health_route::health,
        root_route::{hello, root},
    },
};

/// Builds the application router.
pub fn router<R, G>(state: AppState<R, G>) -> Router
where
    R: ContextRetriever + 'static,
    G: AnswerGenerator + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/hello/{name}", get(hello))
        .route("/ask", post(ask_question::<R, G>))
        .route("/health", get(health::<R, G>))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

/// Binds `config.address` and serves until Ctrl+C.
pub async fn start(config: AppConfig) -> Result<(), AppError> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&config.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %config.address, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use contextor::RagPipeline;
    use rag_base::RagBaseError;
    use serde_json::{Value, json};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tower::ServiceExt;

    struct StubRetriever {
        fail: bool,
    }

    impl ContextRetriever for StubRetriever {
        async fn search_similar_texts(
            &self,
            _question: &str,
            _top_k: u64,
        ) -> Result<String, RagBaseError> {
            if self.fail {
                return Err(RagBaseError::Qdrant("connection refused".into()).into_search_error());
            }
            Ok("Paris is the capital of France.".into())
        }
    }

    struct StubGenerator {
        calls: Arc<AtomicUsize>,
        reachable: bool,
    }

    impl AnswerGenerator for StubGenerator {
        fn model(&self) -> &str {
            "stub-model"
        }

        async fn generate_response(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<String, AiLlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("The capital of France is Paris.".into())
        }

        async fn check_connection(&self) -> Result<bool, AiLlmError> {
            if self.reachable {
                Ok(true)
            } else {
                Err(AiLlmError::Connection {
                    provider: Provider::OpenAI,
                    source: Box::new(
                        ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingApiKey)
                            .into(),
                    ),
                })
            }
        }
    }

    struct TestApp {
        router: Router,
        generations: Arc<AtomicUsize>,
    }

    fn app(fail_retrieval: bool, reachable: bool, metrics: bool) -> TestApp {
        let generations = Arc::new(AtomicUsize::new(0));
        let pipeline = RagPipeline::new(
            StubRetriever {
                fail: fail_retrieval,
            },
            StubGenerator {
                calls: generations.clone(),
                reachable,
            },
            metrics,
        );
        TestApp {
            router: router(AppState::new(pipeline)),
            generations,
        }
    }

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_ask(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn root_welcomes() {
        let res = app(false, true, false)
            .router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!({"message": "Welcome to my API"}));
    }

    #[tokio::test]
    async fn hello_greets_by_name() {
        let res = app(false, true, false)
            .router
            .oneshot(Request::get("/hello/Ada").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!({"message": "Hello, Ada!"}));
    }

    #[tokio::test]
    async fn ask_returns_answer_with_metrics() {
        let test = app(false, true, true);
        let res = test
            .router
            .oneshot(post_ask(r#"{"question":"What is the capital of France?","top_k":2}"#))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
        let body = body_json(res).await;
        assert_eq!(body["response"], "The capital of France is Paris.");
        for key in ["context_retrieval", "prompt_building", "response_generation", "total"] {
            assert!(body["timing"][key].is_number(), "missing timing.{key}");
        }
        for key in ["start", "after_retrieval", "after_generation"] {
            assert!(body["resources"][key]["memory_mb"].is_number(), "missing resources.{key}");
        }
        assert_eq!(test.generations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ask_without_metrics_has_only_response() {
        let res = app(false, true, false)
            .router
            .oneshot(post_ask(r#"{"question":"Who wrote Hamlet?"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            body_json(res).await,
            json!({"response": "The capital of France is Paris."})
        );
    }

    #[tokio::test]
    async fn retrieval_failure_is_500_with_detail() {
        let test = app(true, true, true);
        let res = test
            .router
            .oneshot(post_ask(r#"{"question":"What is the capital of France?"}"#))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("error during vector search:"));
        assert_eq!(test.generations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_top_k_is_422() {
        let res = app(false, true, false)
            .router
            .oneshot(post_ask(r#"{"question":"q","top_k":0}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(res).await["detail"].is_string());
    }

    #[tokio::test]
    async fn missing_question_is_422() {
        let res = app(false, true, false)
            .router
            .oneshot(post_ask(r#"{"top_k":2}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let res = app(false, true, false)
            .router
            .oneshot(post_ask(r#"{"question": "#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["detail"].is_string());
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let res = app(false, true, false)
            .router
            .oneshot(
                Request::get("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn health_reports_provider_state() {
        let res = app(false, true, false)
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!({"status": "ok", "model": "stub-model"}));

        let res = app(false, false, false)
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let detail = body_json(res).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("failed to connect to OpenAI"));
    }
}
