//! BedrockRerankClient against a mockito server.

use mockito::{Matcher, Server};
use search_rerank::auth::Credentials;
use search_rerank::rerank::{BedrockRerankClient, RankedIndex, RerankRequest, RerankService};
use serde_json::json;

fn client(base_url: &str) -> BedrockRerankClient {
    BedrockRerankClient::builder()
        .endpoint(base_url)
        .region("us-east-1")
        .credentials(Credentials::new("AKIDTEST", "secret"))
        .timeout_secs(5)
        .build()
        .expect("client builds")
}

fn invoke_path() -> Matcher {
    Matcher::Regex(r"^/model/cohere\.rerank-v3-5(:|%3A)0/invoke$".into())
}

#[tokio::test]
async fn test_rerank_sends_wire_contract() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", invoke_path())
        .match_header(
            "authorization",
            Matcher::Regex(
                r"^AWS4-HMAC-SHA256 Credential=AKIDTEST/\d{8}/us-east-1/bedrock/aws4_request, SignedHeaders=host;x-amz-date, Signature=[0-9a-f]{64}$".into(),
            ),
        )
        .match_header("accept", "application/json")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "query": "feline",
            "documents": ["cats", "dogs", ""],
            "top_n": 2,
            "api_version": 2
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "5b7f3c1e",
                "results": [
                    {"index": 0, "relevance_score": 0.95},
                    {"index": 2, "relevance_score": 0.02}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = RerankRequest::new(
        "feline",
        vec!["cats".to_string(), "dogs".to_string(), String::new()],
        2,
    );
    let ranked = client(&server.url()).rerank(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        ranked,
        vec![RankedIndex::new(0, 0.95), RankedIndex::new(2, 0.02)]
    );
}

#[tokio::test]
async fn test_service_error_is_rerank_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", invoke_path())
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Malformed input request"}"#)
        .create_async()
        .await;

    let err = client(&server.url())
        .rerank(&RerankRequest::new("q", vec!["a".into()], 1))
        .await
        .unwrap_err();
    assert!(err.is_rerank());
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Malformed input request"));
}

#[tokio::test]
async fn test_malformed_response_is_rerank_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", invoke_path())
        .with_status(200)
        .with_body(r#"{"results":"nope"}"#)
        .create_async()
        .await;

    let err = client(&server.url())
        .rerank(&RerankRequest::new("q", vec!["a".into()], 1))
        .await
        .unwrap_err();
    assert!(err.is_rerank());
    assert!(err.to_string().contains("Invalid rerank response"));
}

#[tokio::test]
async fn test_unreachable_service_is_rerank_error() {
    let err = client("http://127.0.0.1:1")
        .rerank(&RerankRequest::new("q", vec!["a".into()], 1))
        .await
        .unwrap_err();
    assert!(err.is_rerank());
}
