//! Candidate extraction and index reconciliation around a [`RerankService`].

use super::types::{RankedIndex, RerankRequest, DEFAULT_API_VERSION};
use super::RerankService;
use crate::config::DEFAULT_TEXT_FIELD;
use crate::types::{Document, RerankResult};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reorders retrieved documents with a remote rerank model.
#[derive(Clone)]
pub struct Reranker {
    service: Arc<dyn RerankService>,
    text_field: String,
    api_version: u32,
}

impl Reranker {
    pub fn new(service: Arc<dyn RerankService>) -> Self {
        Self {
            service,
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            api_version: DEFAULT_API_VERSION,
        }
    }

    /// Field whose text is sent to the model. Defaults to `full_text`.
    pub fn with_text_field(mut self, field: impl Into<String>) -> Self {
        self.text_field = field.into();
        self
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn text_field(&self) -> &str {
        &self.text_field
    }

    /// Rerank `documents` against `query`, keeping the best `top_n`.
    ///
    /// The result has `min(top_n, documents.len())` entries in exactly the
    /// order the service returned them. An empty input returns an empty
    /// result without calling the service.
    pub async fn rerank(
        &self,
        query: &str,
        documents: &[Document],
        top_n: usize,
    ) -> Result<Vec<RerankResult>> {
        if query.trim().is_empty() {
            return Err(Error::validation_with_context(
                "Rerank query must not be empty",
                ErrorContext::new().with_field_path("query"),
            ));
        }
        if top_n == 0 {
            return Err(Error::validation_with_context(
                "top_n must be positive",
                ErrorContext::new().with_field_path("top_n"),
            ));
        }
        if documents.is_empty() {
            debug!("no documents to rerank, skipping service call");
            return Ok(Vec::new());
        }

        let top_n = top_n.min(documents.len());
        let candidates = extract_candidate_texts(documents, &self.text_field);
        let empty = candidates.iter().filter(|t| t.is_empty()).count();
        if empty > 0 {
            debug!(
                empty,
                field = %self.text_field,
                "documents without candidate text are sent as empty strings"
            );
        }

        let request =
            RerankRequest::new(query, candidates, top_n).with_api_version(self.api_version);
        let ranked = self.service.rerank(&request).await?;

        if ranked.len() > top_n {
            return Err(Error::rerank_with_context(
                format!(
                    "Rerank service returned {} results for top_n {}",
                    ranked.len(),
                    top_n
                ),
                ErrorContext::new().with_field_path("results"),
            ));
        }
        if ranked.len() < top_n {
            warn!(
                returned = ranked.len(),
                top_n, "rerank service returned fewer results than requested"
            );
        }

        reconcile(documents, &ranked)
    }
}

/// Text of `field` for every document, index-aligned with `documents`.
pub fn extract_candidate_texts(documents: &[Document], field: &str) -> Vec<String> {
    documents.iter().map(|d| d.text_of(field)).collect()
}

/// Join rerank response entries back onto the documents they index.
///
/// Fails on the first index outside `documents`.
pub fn reconcile(documents: &[Document], ranked: &[RankedIndex]) -> Result<Vec<RerankResult>> {
    ranked
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let document = documents.get(entry.index).ok_or_else(|| {
                Error::rerank_with_context(
                    format!(
                        "Rerank service returned index {} but only {} documents were sent",
                        entry.index,
                        documents.len()
                    ),
                    ErrorContext::new()
                        .with_field_path(format!("results[{}].index", position))
                        .with_source("reconcile"),
                )
            })?;
            Ok(RerankResult::from_document(document, entry.relevance_score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fields;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    enum Reply {
        Fixed(Vec<RankedIndex>),
        Identity,
        Fail,
    }

    struct StubService {
        reply: Reply,
        seen: Mutex<Vec<RerankRequest>>,
    }

    impl StubService {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<RerankRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RerankService for StubService {
        async fn rerank(&self, request: &RerankRequest) -> Result<Vec<RankedIndex>> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Reply::Fixed(r) => Ok(r.clone()),
                Reply::Identity => Ok((0..request.top_n)
                    .map(|i| RankedIndex::new(i, 1.0 - i as f64 * 0.01))
                    .collect()),
                Reply::Fail => Err(Error::rerank("service unavailable")),
            }
        }
    }

    fn doc(id: &str, score: f64, fields: serde_json::Value) -> Document {
        let fields: Fields = fields.as_object().cloned().unwrap_or_default();
        Document::new(id, score, fields)
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc("a", 3.0, json!({"full_text": "cats purr"})),
            doc("b", 2.0, json!({"full_text": "dogs bark"})),
            doc("c", 1.0, json!({"full_text": "lions roar"})),
            doc("d", 0.5, json!({"full_text": "fish swim"})),
        ]
    }

    #[tokio::test]
    async fn test_cats_and_dogs_example() {
        let documents = vec![
            doc("a", 1.0, json!({"full_text": "cats"})),
            doc("b", 0.9, json!({"full_text": "dogs"})),
        ];
        let service = StubService::new(Reply::Fixed(vec![RankedIndex::new(0, 0.95)]));
        let reranker = Reranker::new(service.clone());

        let out = reranker.rerank("feline", &documents, 1).await.unwrap();
        assert_eq!(
            out,
            vec![RerankResult {
                id: "a".into(),
                original_score: 1.0,
                rerank_score: 0.95,
                fields: documents[0].fields.clone(),
            }]
        );

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query_text, "feline");
        assert_eq!(requests[0].candidate_texts, vec!["cats", "dogs"]);
        assert_eq!(requests[0].top_n, 1);
        assert_eq!(requests[0].api_version, 2);
    }

    #[tokio::test]
    async fn test_output_length_matches_top_n() {
        let documents = corpus();
        let reranker = Reranker::new(StubService::new(Reply::Identity));
        for top_n in 1..=documents.len() {
            let out = reranker.rerank("q", &documents, top_n).await.unwrap();
            assert_eq!(out.len(), top_n);
        }
    }

    #[tokio::test]
    async fn test_service_order_is_preserved() {
        let documents = corpus();
        let service = StubService::new(Reply::Fixed(vec![
            RankedIndex::new(2, 0.9),
            RankedIndex::new(0, 0.4),
            RankedIndex::new(3, 0.2),
        ]));
        let out = Reranker::new(service)
            .rerank("q", &documents, 3)
            .await
            .unwrap();

        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "d"]);
        for (result, index) in out.iter().zip([2usize, 0, 3]) {
            assert_eq!(result.fields, documents[index].fields);
            assert_eq!(result.original_score, documents[index].relevance_score);
        }
        assert_eq!(out[0].rerank_score, 0.9);
    }

    #[tokio::test]
    async fn test_identity_round_trip() {
        let documents = corpus();
        let out = Reranker::new(StubService::new(Reply::Identity))
            .rerank("q", &documents, documents.len())
            .await
            .unwrap();
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_missing_text_field_is_empty_candidate() {
        let documents = vec![
            doc("a", 1.0, json!({"full_text": "cats"})),
            doc("b", 0.9, json!({"title": "no body"})),
        ];
        let service = StubService::new(Reply::Identity);
        let out = Reranker::new(service.clone())
            .rerank("q", &documents, 2)
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(service.requests()[0].candidate_texts, vec!["cats", ""]);
    }

    #[tokio::test]
    async fn test_custom_text_field() {
        let documents = vec![doc("a", 1.0, json!({"body": "text", "full_text": "other"}))];
        let service = StubService::new(Reply::Identity);
        Reranker::new(service.clone())
            .with_text_field("body")
            .rerank("q", &documents, 1)
            .await
            .unwrap();
        assert_eq!(service.requests()[0].candidate_texts, vec!["text"]);
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_error() {
        let documents = corpus();
        let service = StubService::new(Reply::Fixed(vec![
            RankedIndex::new(1, 0.9),
            RankedIndex::new(4, 0.8),
        ]));
        let err = Reranker::new(service)
            .rerank("q", &documents, 2)
            .await
            .unwrap_err();
        assert!(err.is_rerank());
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("results[1].index")
        );
    }

    #[tokio::test]
    async fn test_empty_documents_skip_service() {
        let service = StubService::new(Reply::Fail);
        let out = Reranker::new(service.clone())
            .rerank("q", &[], 10)
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_top_n_is_clamped_to_document_count() {
        let documents = corpus();
        let service = StubService::new(Reply::Identity);
        let out = Reranker::new(service.clone())
            .rerank("q", &documents, 50)
            .await
            .unwrap();
        assert_eq!(out.len(), documents.len());
        assert_eq!(service.requests()[0].top_n, documents.len());
    }

    #[tokio::test]
    async fn test_too_many_results_is_error() {
        let documents = corpus();
        let service = StubService::new(Reply::Fixed(vec![
            RankedIndex::new(0, 0.9),
            RankedIndex::new(1, 0.8),
        ]));
        let err = Reranker::new(service)
            .rerank("q", &documents, 1)
            .await
            .unwrap_err();
        assert!(err.is_rerank());
    }

    #[tokio::test]
    async fn test_fewer_results_are_returned_as_is() {
        let documents = corpus();
        let service = StubService::new(Reply::Fixed(vec![RankedIndex::new(3, 0.7)]));
        let out = Reranker::new(service)
            .rerank("q", &documents, 2)
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "d");
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let service = StubService::new(Reply::Identity);
        let reranker = Reranker::new(service.clone());
        let documents = corpus();
        assert!(reranker
            .rerank("q", &documents, 0)
            .await
            .unwrap_err()
            .is_validation());
        assert!(reranker
            .rerank("  ", &documents, 1)
            .await
            .unwrap_err()
            .is_validation());
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let err = Reranker::new(StubService::new(Reply::Fail))
            .rerank("q", &corpus(), 2)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rerank error: service unavailable");
    }

    #[test]
    fn test_reconcile_empty_response() {
        assert!(reconcile(&corpus(), &[]).unwrap().is_empty());
    }
}
