//! GET / and GET /hello/{name}.

use axum::{Json, extract::Path};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Handler: GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to my API".into(),
    })
}

/// Handler: GET /hello/{name}
pub async fn hello(Path(name): Path<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Hello, {name}!"),
    })
}
