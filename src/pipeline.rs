//! Retrieve-then-rerank orchestration.

use crate::auth::Credentials;
use crate::config::{Settings, DEFAULT_INITIAL_SIZE, DEFAULT_TOP_N};
use crate::rerank::{BedrockRerankClient, Reranker};
use crate::retrieval::{OpenSearchRetriever, Retriever};
use crate::types::SearchAndRerankOutput;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Runs a search and reranks its hits.
///
/// Holds no per-query state, so one instance can serve concurrent queries.
#[derive(Clone)]
pub struct SearchReranker {
    retriever: Arc<dyn Retriever>,
    reranker: Reranker,
}

impl SearchReranker {
    pub fn new(retriever: Arc<dyn Retriever>, reranker: Reranker) -> Self {
        Self {
            retriever,
            reranker,
        }
    }

    /// Wire the OpenSearch retriever and Bedrock rerank client from settings.
    pub fn from_settings(settings: &Settings, credentials: Credentials) -> Result<Self> {
        let retriever = OpenSearchRetriever::builder()
            .endpoint(settings.opensearch.endpoint.as_str())
            .index(settings.opensearch.index.as_str())
            .service(settings.opensearch.service.as_str())
            .region(settings.region.as_str())
            .timeout_secs(settings.opensearch.timeout_secs)
            .credentials(credentials.clone())
            .build()?;

        let mut rerank_client = BedrockRerankClient::builder()
            .model_id(settings.rerank.model_id.as_str())
            .region(settings.region.as_str())
            .timeout_secs(settings.rerank.timeout_secs)
            .credentials(credentials);
        if let Some(endpoint) = &settings.rerank.endpoint {
            rerank_client = rerank_client.endpoint(endpoint.as_str());
        }
        let reranker = Reranker::new(Arc::new(rerank_client.build()?))
            .with_text_field(settings.rerank.text_field.as_str());

        Ok(Self::new(Arc::new(retriever), reranker))
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }

    /// Search for `query`, then rerank the `initial_size` hits down to `top_n`.
    ///
    /// Either stage's error is returned as-is; a failed rerank discards the
    /// retrieved hits rather than falling back to search order.
    pub async fn search_and_rerank(
        &self,
        query: &str,
        initial_size: usize,
        top_n: usize,
    ) -> Result<SearchAndRerankOutput> {
        let request_id = Uuid::new_v4();
        let span = info_span!("search_and_rerank", %request_id);
        async {
            info!(query, initial_size, "searching");
            let original_results = self.retriever.search(query, initial_size).await?;
            info!(retrieved = original_results.len(), "search complete");

            let reranked_results = self
                .reranker
                .rerank(query, &original_results, top_n)
                .await?;
            info!(reranked = reranked_results.len(), "rerank complete");

            Ok::<_, Error>(SearchAndRerankOutput {
                query: query.to_string(),
                original_results,
                reranked_results,
            })
        }
        .instrument(span)
        .await
    }

    /// [`search_and_rerank`](Self::search_and_rerank) with 20 retrieved and 10 kept.
    pub async fn search_and_rerank_with_defaults(
        &self,
        query: &str,
    ) -> Result<SearchAndRerankOutput> {
        self.search_and_rerank(query, DEFAULT_INITIAL_SIZE, DEFAULT_TOP_N)
            .await
    }
}
