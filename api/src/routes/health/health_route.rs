//! GET /health: probes the chat provider.

use axum::{Json, extract::State};
use contextor::{AnswerGenerator, ContextRetriever};
use serde::{Deserialize, Serialize};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

/// Handler: GET /health
pub async fn health<R, G>(State(state): State<AppState<R, G>>) -> AppResult<Json<HealthResponse>>
where
    R: ContextRetriever + 'static,
    G: AnswerGenerator + 'static,
{
    let generator = state.pipeline.generator();
    match generator.check_connection().await {
        Ok(true) => Ok(Json(HealthResponse {
            status: "ok".into(),
            model: generator.model().to_string(),
        })),
        Ok(false) => Err(AppError::Unavailable(format!(
            "model provider for {} is not reachable",
            generator.model()
        ))),
        Err(e) => Err(AppError::Unavailable(e.to_string())),
    }
}
