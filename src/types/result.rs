//! Rerank results and the combined round-trip output.

use super::document::{Document, Fields};
use serde::{Deserialize, Serialize};

/// A retrieved document re-scored by the rerank model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    pub id: String,
    /// Score the search service gave the document.
    pub original_score: f64,
    /// Score the rerank model gave the document.
    pub rerank_score: f64,
    #[serde(default)]
    pub fields: Fields,
}

impl RerankResult {
    pub fn from_document(document: &Document, rerank_score: f64) -> Self {
        Self {
            id: document.id.clone(),
            original_score: document.relevance_score,
            rerank_score,
            fields: document.fields.clone(),
        }
    }
}

/// Everything produced by one `search_and_rerank` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAndRerankOutput {
    pub query: String,
    pub original_results: Vec<Document>,
    pub reranked_results: Vec<RerankResult>,
}
