//! OpenSearch (Serverless or managed) retriever.

use super::Retriever;
use crate::auth::{Credentials, SigV4Signer};
use crate::config::{DEFAULT_REGION, DEFAULT_SEARCH_SERVICE, DEFAULT_SEARCH_TIMEOUT_SECS};
use crate::transport::{append_path, normalize_endpoint, HttpReply, SignedHttpClient};
use crate::types::{Document, Fields, SearchQuery};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const SOURCE: &str = "opensearch";

/// Runs `multi_match` queries across every field of one index.
pub struct OpenSearchRetriever {
    http: SignedHttpClient,
    search_url: Url,
    index: String,
}

impl OpenSearchRetriever {
    pub fn builder() -> OpenSearchRetrieverBuilder {
        OpenSearchRetrieverBuilder::new()
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Request body for a `multi_match` across all fields.
    pub fn query_body(query: &SearchQuery) -> Value {
        serde_json::json!({
            "query": {
                "multi_match": {
                    "query": query.text,
                    "fields": ["*"]
                }
            },
            "size": query.requested_count
        })
    }

    /// Extract documents from a `_search` response body.
    pub fn parse_hits(body: &Value) -> Result<Vec<Document>> {
        let hits = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .ok_or_else(|| malformed("missing hits.hits array", "hits.hits"))?;

        let mut documents = Vec::with_capacity(hits.len());
        for (i, hit) in hits.iter().enumerate() {
            let id = hit
                .get("_id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| malformed("hit without string _id", format!("hits.hits[{}]._id", i)))?;
            let score = hit
                .get("_score")
                .and_then(|v| v.as_f64())
                .ok_or_else(|| {
                    malformed("hit without numeric _score", format!("hits.hits[{}]._score", i))
                })?;
            let fields: Fields = match hit.get("_source") {
                None | Some(Value::Null) => Fields::new(),
                Some(Value::Object(map)) => map.clone(),
                Some(_) => {
                    return Err(malformed(
                        "hit _source is not an object",
                        format!("hits.hits[{}]._source", i),
                    ))
                }
            };
            documents.push(Document::new(id, score, fields));
        }
        Ok(documents)
    }

    fn check_status(&self, reply: &HttpReply) -> Result<()> {
        if reply.is_success() {
            return Ok(());
        }
        let status = reply.status.as_u16();
        let message = match status {
            404 => format!("index '{}' not found", self.index),
            401 | 403 => "search service rejected the credentials".to_string(),
            _ => format!("search service returned HTTP {}", reply.status),
        };
        Err(Error::retrieval_with_context(
            message,
            ErrorContext::new()
                .with_status(status)
                .with_details(reply.body_excerpt())
                .with_source(SOURCE),
        ))
    }
}

#[async_trait]
impl Retriever for OpenSearchRetriever {
    async fn search(&self, query: &str, size: usize) -> Result<Vec<Document>> {
        let query = SearchQuery::new(query, size)?;
        let body = serde_json::to_vec(&Self::query_body(&query))?;

        debug!(index = %self.index, size, "searching");
        let reply = self.http.post_json(&self.search_url, body).await.map_err(|e| {
            Error::retrieval_with_context(
                format!("Search request failed: {}", e),
                ErrorContext::new().with_source(SOURCE),
            )
        })?;
        self.check_status(&reply)?;

        let json: Value = serde_json::from_str(&reply.body).map_err(|e| {
            Error::retrieval_with_context(
                format!("Search response is not valid JSON: {}", e),
                ErrorContext::new()
                    .with_details(reply.body_excerpt())
                    .with_source(SOURCE),
            )
        })?;
        let documents = Self::parse_hits(&json)?;
        info!(index = %self.index, hits = documents.len(), "retrieved documents");
        Ok(documents)
    }
}

fn malformed(message: &str, field: impl Into<String>) -> Error {
    Error::retrieval_with_context(
        format!("Malformed search response: {}", message),
        ErrorContext::new()
            .with_field_path(field)
            .with_source(SOURCE),
    )
}

pub struct OpenSearchRetrieverBuilder {
    endpoint: Option<String>,
    index: Option<String>,
    region: Option<String>,
    service: Option<String>,
    credentials: Option<Credentials>,
    timeout_secs: u64,
}

impl OpenSearchRetrieverBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            index: None,
            region: None,
            service: None,
            credentials: None,
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
        }
    }
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
    /// SigV4 service name; `aoss` unless talking to a managed domain (`es`).
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<OpenSearchRetriever> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::configuration("OpenSearch endpoint must be specified"))?;
        let base = normalize_endpoint(&endpoint, "opensearch.endpoint")?;
        let index = self
            .index
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| Error::configuration("OpenSearch index must be specified"))?;
        let credentials = self
            .credentials
            .ok_or_else(|| Error::configuration("Credentials required for OpenSearch"))?;
        credentials.validate()?;
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "Timeout must be greater than zero",
                ErrorContext::new().with_field_path("opensearch.timeout_secs"),
            ));
        }

        let region = self.region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let service = self
            .service
            .unwrap_or_else(|| DEFAULT_SEARCH_SERVICE.to_string());
        let signer = SigV4Signer::new(credentials, region, service).with_content_sha256(true);
        let http = SignedHttpClient::new(signer, Duration::from_secs(self.timeout_secs))?;
        let search_url = append_path(&base, &[index.as_str(), "_search"]);

        Ok(OpenSearchRetriever {
            http,
            search_url,
            index,
        })
    }
}

impl Default for OpenSearchRetrieverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_body_shape() {
        let q = SearchQuery::new("solar flares", 100).unwrap();
        let body = OpenSearchRetriever::query_body(&q);
        assert_eq!(
            body,
            json!({
                "query": {"multi_match": {"query": "solar flares", "fields": ["*"]}},
                "size": 100
            })
        );
    }

    #[test]
    fn test_parse_hits_keeps_order_and_fields() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {"_id": "x1", "_score": 7.5, "_source": {"full_text": "alpha", "n": 1}},
                    {"_id": "x2", "_score": 3.25, "_source": {"title": "beta"}}
                ]
            }
        });
        let docs = OpenSearchRetriever::parse_hits(&body).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "x1");
        assert_eq!(docs[0].relevance_score, 7.5);
        assert_eq!(docs[0].fields["full_text"], "alpha");
        assert_eq!(docs[0].fields["n"], 1);
        assert_eq!(docs[1].id, "x2");
        assert!(docs[1].fields.get("full_text").is_none());
    }

    #[test]
    fn test_parse_hits_without_source() {
        let body = json!({"hits": {"hits": [{"_id": "x", "_score": 1.0}]}});
        let docs = OpenSearchRetriever::parse_hits(&body).unwrap();
        assert!(docs[0].fields.is_empty());
    }

    #[test]
    fn test_parse_hits_empty() {
        let body = json!({"hits": {"hits": []}});
        assert!(OpenSearchRetriever::parse_hits(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hits_malformed() {
        for body in [
            json!({"error": "nope"}),
            json!({"hits": {"hits": [{"_score": 1.0}]}}),
            json!({"hits": {"hits": [{"_id": "x", "_score": null}]}}),
            json!({"hits": {"hits": [{"_id": "x", "_score": 1.0, "_source": "text"}]}}),
        ] {
            let err = OpenSearchRetriever::parse_hits(&body).unwrap_err();
            assert!(err.is_retrieval(), "expected retrieval error for {}", body);
        }
    }

    #[test]
    fn test_builder_requires_credentials() {
        let err = OpenSearchRetriever::builder()
            .endpoint("https://abc.aoss.amazonaws.com")
            .index("idx")
            .build()
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_builder_builds_search_url() {
        let retriever = OpenSearchRetriever::builder()
            .endpoint("abc.us-east-1.aoss.amazonaws.com")
            .index("sde-web")
            .credentials(Credentials::new("AKID", "secret"))
            .build()
            .unwrap();
        assert_eq!(
            retriever.search_url.as_str(),
            "https://abc.us-east-1.aoss.amazonaws.com/sde-web/_search"
        );
        assert_eq!(retriever.http.signer().service(), "aoss");
        assert_eq!(retriever.http.signer().region(), "us-east-1");
    }
}
