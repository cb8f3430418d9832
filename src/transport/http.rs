use crate::auth::{uri_encode, SigV4Signer};
use crate::{Error, ErrorContext, Result};
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body prefix small enough to put in an error message.
    pub fn body_excerpt(&self) -> String {
        const MAX: usize = 512;
        if self.body.chars().count() <= MAX {
            self.body.clone()
        } else {
            let head: String = self.body.chars().take(MAX).collect();
            format!("{}...", head)
        }
    }
}

/// A `reqwest` client that SigV4-signs every JSON request it sends.
pub struct SignedHttpClient {
    client: reqwest::Client,
    signer: SigV4Signer,
}

impl SignedHttpClient {
    pub fn new(signer: SigV4Signer, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, signer })
    }

    pub fn signer(&self) -> &SigV4Signer {
        &self.signer
    }

    /// POST `body` as JSON to `url` and return the reply whatever its status.
    pub async fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
    ) -> std::result::Result<HttpReply, TransportError> {
        let signed = self
            .signer
            .sign("POST", url, &body, Utc::now())
            .map_err(|e| TransportError::Signing(e.to_string()))?;

        let mut request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        for (name, value) in signed {
            request = request.header(name, value);
        }

        debug!(
            url = %url,
            service = self.signer.service(),
            bytes = body.len(),
            "sending signed request"
        );
        let response = request.body(body).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url = %url, status = status.as_u16(), "received response");
        Ok(HttpReply { status, body })
    }
}

/// Parse a service endpoint, defaulting to `https://` when no scheme is given.
///
/// Any trailing slash is dropped so path segments can be appended.
pub fn normalize_endpoint(raw: &str, field: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::configuration_with_context(
            "Endpoint must not be empty",
            ErrorContext::new().with_field_path(field),
        ));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).map_err(|e| {
        Error::configuration_with_context(
            format!("Invalid endpoint URL: {}", e),
            ErrorContext::new()
                .with_field_path(field)
                .with_details(raw.to_string()),
        )
    })?;
    if url.host_str().is_none() {
        return Err(Error::configuration_with_context(
            "Endpoint URL has no host",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(raw.to_string()),
        ));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
pub(crate) fn append_path(base: &Url, segments: &[&str]) -> Url {
    let mut path = base.path().trim_end_matches('/').to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&uri_encode(segment, true));
    }
    let mut url = base.clone();
    url.set_path(&path);
    url
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request signing failed: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoint_adds_scheme() {
        let url = normalize_endpoint("abc.us-east-1.aoss.amazonaws.com/", "endpoint").unwrap();
        assert_eq!(url.as_str(), "https://abc.us-east-1.aoss.amazonaws.com/");
        assert_eq!(url.host_str(), Some("abc.us-east-1.aoss.amazonaws.com"));
    }

    #[test]
    fn test_normalize_endpoint_keeps_explicit_scheme() {
        let url = normalize_endpoint("http://127.0.0.1:9200", "endpoint").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(9200));
    }

    #[test]
    fn test_normalize_endpoint_rejects_empty() {
        let err = normalize_endpoint("  ", "opensearch.endpoint").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_append_path_encodes_segments() {
        let base = normalize_endpoint("https://bedrock.example.com", "endpoint").unwrap();
        let url = append_path(&base, &["model", "cohere.rerank-v3-5:0", "invoke"]);
        assert_eq!(url.path(), "/model/cohere.rerank-v3-5%3A0/invoke");
    }

    #[test]
    fn test_append_path_keeps_base_prefix() {
        let base = normalize_endpoint("http://localhost:1234/proxy/", "endpoint").unwrap();
        let url = append_path(&base, &["idx", "_search"]);
        assert_eq!(url.as_str(), "http://localhost:1234/proxy/idx/_search");
    }

    #[test]
    fn test_body_excerpt_truncates() {
        let reply = HttpReply {
            status: StatusCode::OK,
            body: "x".repeat(2000),
        };
        let excerpt = reply.body_excerpt();
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 515);
    }
}
