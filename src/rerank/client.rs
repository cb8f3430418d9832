//! Rerank client for Cohere Rerank hosted on Amazon Bedrock.

use super::types::{RankedIndex, RerankRequest, RerankResponse};
use super::RerankService;
use crate::auth::{Credentials, SigV4Signer};
use crate::config::{DEFAULT_RERANK_MODEL_ID, DEFAULT_RERANK_TIMEOUT_SECS, DEFAULT_REGION};
use crate::transport::{append_path, normalize_endpoint, SignedHttpClient};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SOURCE: &str = "bedrock_rerank";
const SIGNING_SERVICE: &str = "bedrock";

/// Client for the Bedrock `InvokeModel` rerank endpoint.
pub struct BedrockRerankClient {
    http: SignedHttpClient,
    invoke_url: Url,
    model_id: String,
}

impl BedrockRerankClient {
    pub fn builder() -> BedrockRerankClientBuilder {
        BedrockRerankClientBuilder::new()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn invoke_url(&self) -> &Url {
        &self.invoke_url
    }
}

#[async_trait]
impl RerankService for BedrockRerankClient {
    async fn rerank(&self, request: &RerankRequest) -> Result<Vec<RankedIndex>> {
        let body = serde_json::to_vec(request)?;
        debug!(
            model = %self.model_id,
            candidates = request.candidate_texts.len(),
            top_n = request.top_n,
            "invoking rerank model"
        );

        let reply = self.http.post_json(&self.invoke_url, body).await.map_err(|e| {
            Error::rerank_with_context(
                format!("Rerank request failed: {}", e),
                ErrorContext::new().with_source(SOURCE),
            )
        })?;
        if !reply.is_success() {
            return Err(Error::rerank_with_context(
                format!("Rerank API error ({})", reply.status),
                ErrorContext::new()
                    .with_status(reply.status.as_u16())
                    .with_details(reply.body_excerpt())
                    .with_source(SOURCE),
            ));
        }

        let parsed: RerankResponse = serde_json::from_str(&reply.body).map_err(|e| {
            Error::rerank_with_context(
                format!("Invalid rerank response: {}", e),
                ErrorContext::new()
                    .with_details(reply.body_excerpt())
                    .with_source(SOURCE),
            )
        })?;
        Ok(parsed.results)
    }
}

pub struct BedrockRerankClientBuilder {
    model_id: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
    credentials: Option<Credentials>,
    timeout_secs: u64,
}

impl BedrockRerankClientBuilder {
    pub fn new() -> Self {
        Self {
            model_id: None,
            region: None,
            endpoint: None,
            credentials: None,
            timeout_secs: DEFAULT_RERANK_TIMEOUT_SECS,
        }
    }
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
    /// Replace the regional `bedrock-runtime` endpoint (VPC endpoints, tests).
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
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

    pub fn build(self) -> Result<BedrockRerankClient> {
        let model_id = self
            .model_id
            .unwrap_or_else(|| DEFAULT_RERANK_MODEL_ID.to_string());
        if model_id.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "Rerank model id must not be empty",
                ErrorContext::new().with_field_path("rerank.model_id"),
            ));
        }
        let region = self.region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let credentials = self
            .credentials
            .ok_or_else(|| Error::configuration("Credentials required for Bedrock rerank"))?;
        credentials.validate()?;
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "Timeout must be greater than zero",
                ErrorContext::new().with_field_path("rerank.timeout_secs"),
            ));
        }

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", region));
        let base = normalize_endpoint(&endpoint, "rerank.endpoint")?;
        let invoke_url = append_path(&base, &["model", model_id.as_str(), "invoke"]);

        let signer = SigV4Signer::new(credentials, region, SIGNING_SERVICE);
        let http = SignedHttpClient::new(signer, Duration::from_secs(self.timeout_secs))?;
        Ok(BedrockRerankClient {
            http,
            invoke_url,
            model_id,
        })
    }
}

impl Default for BedrockRerankClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
