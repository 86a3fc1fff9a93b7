//! Retrieval seam: anything that can turn a question into a context string.

use std::future::Future;

use rag_base::{RagBaseError, VectorSearch};

/// Source of context passages for a question.
pub trait ContextRetriever: Send + Sync {
    /// Returns the top-`top_k` passages joined into a single context string.
    fn search_similar_texts(
        &self,
        question: &str,
        top_k: u64,
    ) -> impl Future<Output = Result<String, RagBaseError>> + Send;
}

impl ContextRetriever for VectorSearch {
    fn search_similar_texts(
        &self,
        question: &str,
        top_k: u64,
    ) -> impl Future<Output = Result<String, RagBaseError>> + Send {
        VectorSearch::search_similar_texts(self, question, top_k)
    }
}
