//! Qdrant vector DB helpers: connection construction and top-K search
//! using the builder API of `qdrant_client`.
//!
//! This module does **not** create embeddings, only DB I/O.
//!
//! ## Public API
//! - [`connect`] → `Qdrant`
//! - [`search_top_k`] → passages ordered by descending similarity

use std::time::Duration;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    PayloadIncludeSelector, ScoredPoint, SearchParamsBuilder, SearchPointsBuilder, value::Kind,
    with_payload_selector::SelectorOptions,
};
use tracing::{debug, warn};

use crate::errors::rag_base_error::RagBaseError;
use crate::structs::rag_base_config::QdrantConfig;
use crate::structs::search_result::SearchHit;

/// Payload field holding the passage text.
pub const TEXT_FIELD: &str = "text";

/// Build a gRPC client for `cfg.url` authenticated with `cfg.api_key`.
///
/// Channels are opened lazily, so this call performs no network I/O.
///
/// # Errors
/// Returns `RagBaseError::Qdrant` if the client cannot be constructed.
pub fn connect(cfg: &QdrantConfig) -> Result<Qdrant, RagBaseError> {
    let timeout = Duration::from_secs(cfg.timeout_secs);

    Qdrant::from_url(&cfg.url)
        .api_key(cfg.api_key.clone())
        .timeout(timeout)
        .connect_timeout(timeout)
        .skip_compatibility_check()
        .build()
        .map_err(|e| RagBaseError::Qdrant(format!("client build: {e}")))
}

/// Run k-NN search for a **query vector** and return the `text` payload of each hit.
///
/// Only the `text` field is requested. Points without a string `text` are
/// skipped with a warning.
///
/// # Errors
/// Returns `RagBaseError::Qdrant` on transport/server errors.
pub async fn search_top_k(
    client: &Qdrant,
    cfg: &QdrantConfig,
    query_vec: Vec<f32>,
    top_k: u64,
) -> Result<Vec<SearchHit>, RagBaseError> {
    let params = SearchParamsBuilder::default()
        .hnsw_ef(cfg.hnsw_ef)
        .exact(cfg.exact);

    let builder = SearchPointsBuilder::new(&cfg.collection, query_vec, top_k)
        .params(params)
        .with_payload(text_only_selector());

    let resp = client
        .search_points(builder)
        .await
        .map_err(|e| RagBaseError::Qdrant(format!("search_points: {e}")))?;

    debug!(
        collection = %cfg.collection,
        top_k,
        returned = resp.result.len(),
        "search_points completed"
    );

    Ok(resp.result.into_iter().filter_map(scored_point_to_hit).collect())
}

fn text_only_selector() -> SelectorOptions {
    SelectorOptions::Include(PayloadIncludeSelector {
        fields: vec![TEXT_FIELD.to_string()],
    })
}

/// Map a `ScoredPoint` into a [`SearchHit`] if it carries a string `text` payload.
fn scored_point_to_hit(sp: ScoredPoint) -> Option<SearchHit> {
    match sp.payload.get(TEXT_FIELD).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(text)) => Some(SearchHit {
            score: sp.score,
            text: text.clone(),
        }),
        _ => {
            warn!(score = sp.score, "hit without string `text` payload skipped");
            None
        }
    }
}
