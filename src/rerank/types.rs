//! Rerank wire types.

use serde::{Deserialize, Serialize};

/// API version understood by Cohere Rerank 3.5 on Bedrock.
pub const DEFAULT_API_VERSION: u32 = 2;

/// Request sent to the rerank service.
///
/// `candidate_texts[i]` is the text of the i-th input document; response
/// indices point into this list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankRequest {
    #[serde(rename = "query")]
    pub query_text: String,
    #[serde(rename = "documents")]
    pub candidate_texts: Vec<String>,
    pub top_n: usize,
    pub api_version: u32,
}

impl RerankRequest {
    pub fn new(query_text: impl Into<String>, candidate_texts: Vec<String>, top_n: usize) -> Self {
        Self {
            query_text: query_text.into(),
            candidate_texts,
            top_n,
            api_version: DEFAULT_API_VERSION,
        }
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }
}

/// One entry of a rerank response: a position in the request's candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedIndex {
    pub index: usize,
    pub relevance_score: f64,
}

impl RankedIndex {
    pub fn new(index: usize, relevance_score: f64) -> Self {
        Self {
            index,
            relevance_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    pub results: Vec<RankedIndex>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_names() {
        let req = RerankRequest::new("feline", vec!["cats".into(), "dogs".into()], 1);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "query": "feline",
                "documents": ["cats", "dogs"],
                "top_n": 1,
                "api_version": 2
            })
        );
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let resp: RerankResponse = serde_json::from_value(json!({
            "id": "abc",
            "results": [{"index": 1, "relevance_score": 0.5, "document": {"text": "x"}}]
        }))
        .unwrap();
        assert_eq!(resp.results, vec![RankedIndex::new(1, 0.5)]);
    }

    #[test]
    fn test_response_rejects_negative_index() {
        let parsed = serde_json::from_value::<RerankResponse>(json!({
            "results": [{"index": -1, "relevance_score": 0.5}]
        }));
        assert!(parsed.is_err());
    }
}
