//! RAG + LLM gateway.
//!
//! Public API: [`RagPipeline::ask`]. It retrieves the top-K passages for the
//! question, inlines them into a fixed prompt template, calls the chat model
//! and returns the answer, optionally with per-stage timings and process
//! resource samples.

mod api_types;
mod error;
mod llm;
pub mod metrics;
pub mod prompt;
mod retrieve;

pub use api_types::{AskInput, AskOutcome};
pub use error::{ContextorError, FailureKind};
pub use llm::AnswerGenerator;
pub use retrieve::ContextRetriever;

use std::time::Instant;

use tracing::{debug, error, info};

use metrics::{ResourceProbe, ResourceReport, StageTimings};
use prompt::build_rag_prompt;

/// Retrieve → prompt → generate orchestrator.
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Debug)]
pub struct RagPipeline<R, G> {
    retriever: R,
    generator: G,
    probe: Option<ResourceProbe>,
}

impl<R, G> RagPipeline<R, G>
where
    R: ContextRetriever,
    G: AnswerGenerator,
{
    /// `include_metrics` attaches timings and resource samples to every outcome.
    pub fn new(retriever: R, generator: G, include_metrics: bool) -> Self {
        Self {
            retriever,
            generator,
            probe: include_metrics.then(ResourceProbe::new),
        }
    }

    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Answers one question.
    ///
    /// Each stage runs exactly once and in order; the first failure is
    /// returned tagged with its stage. Measurements never alter the flow.
    ///
    /// # Errors
    /// - [`ContextorError::Retrieval`] if the context search fails
    /// - [`ContextorError::Generation`] if the model call fails
    pub async fn ask(&self, input: &AskInput) -> Result<AskOutcome, ContextorError> {
        let probe = self.probe.as_ref();
        let started = Instant::now();
        let start_sample = probe.map(ResourceProbe::sample);

        info!(
            stage = "received",
            top_k = input.top_k,
            question_len = input.question.len(),
            model = self.generator.model(),
            "ask: start"
        );

        // 1) Context retrieval
        let stage_started = Instant::now();
        let context = self
            .retriever
            .search_similar_texts(&input.question, input.top_k)
            .await
            .map_err(|e| {
                let err = ContextorError::Retrieval(e);
                error!(stage = %err.kind(), error = %err, "ask: failed");
                err
            })?;
        let retrieval_took = stage_started.elapsed();
        let after_retrieval = probe.map(ResourceProbe::sample);
        debug!(
            stage = "context_retrieved",
            context_len = context.len(),
            latency_ms = retrieval_took.as_millis(),
            "ask: context retrieved"
        );

        // 2) Prompt
        let stage_started = Instant::now();
        let user_prompt = build_rag_prompt(&context, &input.question);
        let prompt_took = stage_started.elapsed();
        debug!(
            stage = "prompt_built",
            prompt_len = user_prompt.len(),
            "ask: prompt built"
        );

        // 3) Generation
        let stage_started = Instant::now();
        let response = self
            .generator
            .generate_response(&input.system_prompt, &user_prompt)
            .await
            .map_err(|e| {
                let err = ContextorError::Generation(e);
                error!(stage = %err.kind(), error = %err, "ask: failed");
                err
            })?;
        let generation_took = stage_started.elapsed();
        let after_generation = probe.map(ResourceProbe::sample);
        let total = started.elapsed();

        info!(
            stage = "response_generated",
            answer_len = response.len(),
            latency_ms = total.as_millis(),
            "ask: finished"
        );

        let timing = probe.map(|_| {
            StageTimings::from_durations(retrieval_took, prompt_took, generation_took, total)
        });
        let resources = match (start_sample, after_retrieval, after_generation) {
            (Some(start), Some(after_retrieval), Some(after_generation)) => Some(ResourceReport {
                start,
                after_retrieval,
                after_generation,
            }),
            _ => None,
        };

        Ok(AskOutcome {
            response,
            timing,
            resources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
    use rag_base::RagBaseError;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct FakeRetriever {
        log: CallLog,
        result: Result<String, String>,
    }

    impl ContextRetriever for FakeRetriever {
        async fn search_similar_texts(
            &self,
            question: &str,
            top_k: u64,
        ) -> Result<String, RagBaseError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("retrieve:{question}:{top_k}"));
            self.result
                .clone()
                .map_err(|m| RagBaseError::Qdrant(m).into_search_error())
        }
    }

    struct FakeGenerator {
        log: CallLog,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    impl AnswerGenerator for FakeGenerator {
        fn model(&self) -> &str {
            "fake-model"
        }

        async fn generate_response(
            &self,
            system_prompt: &str,
            user_prompt: &str,
        ) -> Result<String, AiLlmError> {
            self.log.lock().unwrap().push("generate".into());
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.into(), user_prompt.into()));
            if self.fail {
                return Err(
                    ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into(),
                );
            }
            Ok("The capital of France is Paris.".into())
        }

        async fn check_connection(&self) -> Result<bool, AiLlmError> {
            Ok(true)
        }
    }

    struct Harness {
        pipeline: RagPipeline<FakeRetriever, FakeGenerator>,
        log: CallLog,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
    }

    fn harness(retrieval: Result<&str, &str>, fail_generation: bool, metrics: bool) -> Harness {
        let log = CallLog::default();
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let retriever = FakeRetriever {
            log: log.clone(),
            result: retrieval.map(str::to_string).map_err(str::to_string),
        };
        let generator = FakeGenerator {
            log: log.clone(),
            prompts: prompts.clone(),
            fail: fail_generation,
        };
        Harness {
            pipeline: RagPipeline::new(retriever, generator, metrics),
            log,
            prompts,
        }
    }

    #[tokio::test]
    async fn answers_with_retrieved_context() {
        let h = harness(
            Ok("Paris is the capital of France.\nFrance is in Europe."),
            false,
            true,
        );
        let mut input = AskInput::new("What is the capital of France?");
        input.top_k = 2;

        let out = h.pipeline.ask(&input).await.unwrap();

        assert_eq!(out.response, "The capital of France is Paris.");
        assert_eq!(
            *h.log.lock().unwrap(),
            vec!["retrieve:What is the capital of France?:2", "generate"]
        );

        let prompts = h.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, prompt::DEFAULT_ASSISTANT_PROMPT);
        assert_eq!(
            prompts[0].1,
            build_rag_prompt(
                "Paris is the capital of France.\nFrance is in Europe.",
                "What is the capital of France?"
            )
        );

        let timing = out.timing.expect("timing enabled");
        assert!(timing.total >= timing.context_retrieval);
        assert!(timing.total >= timing.response_generation);
        assert!(out.resources.is_some());
    }

    #[tokio::test]
    async fn sentinel_context_still_reaches_model() {
        let h = harness(Ok(rag_base::NO_CONTEXT_FOUND), false, false);
        let out = h
            .pipeline
            .ask(&AskInput::new("Who wrote Hamlet?"))
            .await
            .unwrap();

        assert!(!out.response.is_empty());
        assert!(out.timing.is_none());
        assert!(out.resources.is_none());
        assert!(
            h.prompts.lock().unwrap()[0]
                .1
                .contains("Context:\nNo relevant context found.\n")
        );
    }

    #[tokio::test]
    async fn retrieval_failure_skips_generation() {
        let h = harness(Err("connection refused"), false, true);
        let err = h
            .pipeline
            .ask(&AskInput::new("What is the capital of France?"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Retrieval);
        assert!(err.to_string().starts_with("error during vector search:"));
        assert_eq!(
            *h.log.lock().unwrap(),
            vec!["retrieve:What is the capital of France?:3"]
        );
    }

    #[tokio::test]
    async fn generation_failure_is_tagged() {
        let h = harness(Ok("some context"), true, false);
        let err = h
            .pipeline
            .ask(&AskInput::new("What is the capital of France?"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Generation);
        assert_eq!(h.log.lock().unwrap().len(), 2);
    }

    #[test]
    fn outcome_omits_disabled_metrics() {
        let out = AskOutcome {
            response: "ok".into(),
            timing: None,
            resources: None,
        };
        assert_eq!(serde_json::to_value(&out).unwrap(), serde_json::json!({"response": "ok"}));
    }
}
