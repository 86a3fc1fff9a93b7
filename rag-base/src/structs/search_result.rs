use serde::{Deserialize, Serialize};

/// One retrieved passage, in the order returned by the vector database
/// (descending similarity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Inner-product similarity score reported by Qdrant.
    pub score: f32,

    /// Passage text taken from the point's `text` payload field.
    pub text: String,
}
