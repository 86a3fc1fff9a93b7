//! POST /ask: answers a question with retrieved context.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use contextor::{AnswerGenerator, AskOutcome, ContextRetriever};
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::request_id::RequestId,
    routes::ask::ask_request::AskRequest,
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the capital of France?","top_k":2}'
/// ```
pub async fn ask_question<R, G>(
    State(state): State<AppState<R, G>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Json<AskOutcome>>
where
    R: ContextRetriever + 'static,
    G: AnswerGenerator + 'static,
{
    let Json(body) = payload?;
    let input = body.validate()?;

    info!(request_id = %request_id, top_k = input.top_k, "ask request accepted");

    let outcome = state.pipeline.ask(&input).await?;
    Ok(Json(outcome))
}
