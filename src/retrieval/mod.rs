//! Retrieval stage: lexical search returning scored documents.
//!
//! [`Retriever`] is the seam the pipeline depends on; [`OpenSearchRetriever`]
//! is the SigV4-signed OpenSearch implementation.

mod opensearch;

pub use opensearch::{OpenSearchRetriever, OpenSearchRetrieverBuilder};

use crate::types::Document;
use crate::Result;
use async_trait::async_trait;

/// A search backend returning scored, ranked hits for free-text queries.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `size` hits for `query` in the backend's relevance order.
    async fn search(&self, query: &str, size: usize) -> Result<Vec<Document>>;
}
