//! Tags every request with an `X-Request-Id` and logs its outcome.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::info;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request id made available to handlers through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Reuses a non-blank incoming id or generates `req-<unix nanos>`.
fn resolve_request_id(req: &Request<Body>) -> HeaderValue {
    if let Some(h) = req.headers().get(&REQUEST_ID_HEADER) {
        if h.to_str().is_ok_and(|v| !v.trim().is_empty()) {
            return h.clone();
        }
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    HeaderValue::from_str(&format!("req-{nanos}")).unwrap_or(HeaderValue::from_static("req-0"))
}

pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let header = resolve_request_id(&req);
    let id = header.to_str().unwrap_or_default().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    req.headers_mut().insert(REQUEST_ID_HEADER, header.clone());
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    res.headers_mut().insert(REQUEST_ID_HEADER, header);

    info!(
        request_id = %id,
        %method,
        path = %path,
        status = res.status().as_u16(),
        latency_ms = started.elapsed().as_millis(),
        "request completed"
    );

    res
}
