use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::app_state::ConfigError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    /// Body rejected by the JSON extractor with a status other than 400/422.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    // --- Pipeline ---
    #[error(transparent)]
    Pipeline(#[from] ContextorError),

    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Http { status, .. } => *status,

            // 5xx
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unprocessable(_) => "UNPROCESSABLE_ENTITY",
            AppError::Http { .. } => "REJECTED",
            AppError::Pipeline(e) => match e.kind() {
                contextor::FailureKind::Retrieval => "RETRIEVAL_FAILED",
                contextor::FailureKind::Generation => "GENERATION_FAILED",
            },
            AppError::Unavailable(_) => "UNAVAILABLE",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), %status, error = %self, "request failed");
        } else {
            warn!(code = self.error_code(), %status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Malformed JSON is a 400; well-formed JSON of the wrong shape is a 422.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        let message = err.body_text();
        match err.status() {
            StatusCode::BAD_REQUEST => AppError::BadRequest(message),
            StatusCode::UNPROCESSABLE_ENTITY => AppError::Unprocessable(message),
            status => AppError::Http { status, message },
        }
    }
}
