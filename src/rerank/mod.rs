//! Rerank stage: re-scores retrieved documents with a hosted cross-encoder.
//!
//! [`RerankService`] is the single-method seam over the remote model;
//! [`BedrockRerankClient`] implements it for Cohere Rerank on Bedrock.
//! [`Reranker`] does the local half: candidate text extraction and mapping
//! the service's positional indices back onto the input documents.

mod client;
mod reranker;
mod types;

pub use client::{BedrockRerankClient, BedrockRerankClientBuilder};
pub use reranker::{extract_candidate_texts, reconcile, Reranker};
pub use types::{RankedIndex, RerankRequest, RerankResponse, DEFAULT_API_VERSION};

use crate::Result;
use async_trait::async_trait;

/// A remote relevance model.
///
/// Implementations return entries in the service's relevance order; callers
/// trust that order and never re-sort it.
#[async_trait]
pub trait RerankService: Send + Sync {
    async fn rerank(&self, request: &RerankRequest) -> Result<Vec<RankedIndex>>;
}
