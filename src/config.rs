//! Runtime settings.
//!
//! Settings come from an optional YAML file, are then overridden by
//! environment variables, and are validated before any client is built:
//!
//! ```yaml
//! region: us-east-1
//! initial_size: 100
//! top_n: 20
//! opensearch:
//!   endpoint: https://abc123.us-east-1.aoss.amazonaws.com
//!   index: sde-web
//! rerank:
//!   model_id: cohere.rerank-v3-5:0
//!   text_field: full_text
//! ```

use crate::transport::normalize_endpoint;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_INITIAL_SIZE: usize = 20;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_SEARCH_SERVICE: &str = "aoss";
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RERANK_MODEL_ID: &str = "cohere.rerank-v3-5:0";
pub const DEFAULT_RERANK_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TEXT_FIELD: &str = "full_text";
pub const DEFAULT_OUTPUT_PATH: &str = "reranking_results.json";

pub const ENV_ENDPOINT: &str = "SEARCH_RERANK_ENDPOINT";
pub const ENV_INDEX: &str = "SEARCH_RERANK_INDEX";
pub const ENV_REGION: &str = "SEARCH_RERANK_REGION";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_MODEL_ID: &str = "SEARCH_RERANK_MODEL_ID";
pub const ENV_INITIAL_SIZE: &str = "SEARCH_RERANK_INITIAL_SIZE";
pub const ENV_TOP_N: &str = "SEARCH_RERANK_TOP_N";
pub const ENV_OUTPUT: &str = "SEARCH_RERANK_OUTPUT";

/// Search service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenSearchSettings {
    pub endpoint: String,
    pub index: String,
    /// SigV4 service name: `aoss` for Serverless collections, `es` for managed domains.
    pub service: String,
    pub timeout_secs: u64,
}

impl Default for OpenSearchSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            index: String::new(),
            service: DEFAULT_SEARCH_SERVICE.to_string(),
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
        }
    }
}

/// Rerank service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankSettings {
    pub model_id: String,
    /// Overrides the regional Bedrock runtime endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Document field whose text is sent to the rerank model.
    pub text_field: String,
    pub timeout_secs: u64,
}

impl Default for RerankSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_RERANK_MODEL_ID.to_string(),
            endpoint: None,
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            timeout_secs: DEFAULT_RERANK_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub opensearch: OpenSearchSettings,
    pub rerank: RerankSettings,
    pub region: String,
    pub initial_size: usize,
    pub top_n: usize,
    pub output_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            opensearch: OpenSearchSettings::default(),
            rerank: RerankSettings::default(),
            region: DEFAULT_REGION.to_string(),
            initial_size: DEFAULT_INITIAL_SIZE,
            top_n: DEFAULT_TOP_N,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl Settings {
    /// Load from an optional file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("Cannot read settings file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config"),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid settings: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Unset or blank variables leave the current value alone.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(ENV_ENDPOINT) {
            self.opensearch.endpoint = v;
        }
        if let Some(v) = get(ENV_INDEX) {
            self.opensearch.index = v;
        }
        if let Some(v) = get(ENV_REGION).or_else(|| get(ENV_AWS_REGION)) {
            self.region = v;
        }
        if let Some(v) = get(ENV_MODEL_ID) {
            self.rerank.model_id = v;
        }
        if let Some(v) = get(ENV_INITIAL_SIZE) {
            self.initial_size = parse_count(ENV_INITIAL_SIZE, &v)?;
        }
        if let Some(v) = get(ENV_TOP_N) {
            self.top_n = parse_count(ENV_TOP_N, &v)?;
        }
        if let Some(v) = get(ENV_OUTPUT) {
            self.output_path = PathBuf::from(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        normalize_endpoint(&self.opensearch.endpoint, "opensearch.endpoint")?;
        if let Some(endpoint) = &self.rerank.endpoint {
            normalize_endpoint(endpoint, "rerank.endpoint")?;
        }
        require_non_empty("opensearch.index", &self.opensearch.index)?;
        require_non_empty("opensearch.service", &self.opensearch.service)?;
        require_non_empty("rerank.model_id", &self.rerank.model_id)?;
        require_non_empty("rerank.text_field", &self.rerank.text_field)?;
        require_non_empty("region", &self.region)?;
        require_positive("initial_size", self.initial_size as u64)?;
        require_positive("top_n", self.top_n as u64)?;
        require_positive("opensearch.timeout_secs", self.opensearch.timeout_secs)?;
        require_positive("rerank.timeout_secs", self.rerank.timeout_secs)?;

        if self.top_n > self.initial_size {
            warn!(
                top_n = self.top_n,
                initial_size = self.initial_size,
                "top_n exceeds initial_size; rerank output is capped at the retrieved count"
            );
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| {
        Error::configuration_with_context(
            "Expected a positive integer",
            ErrorContext::new()
                .with_field_path(key)
                .with_details(value.to_string()),
        )
    })
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::configuration_with_context(
            "Setting must not be empty",
            ErrorContext::new().with_field_path(field),
        ));
    }
    Ok(())
}

fn require_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::configuration_with_context(
            "Setting must be greater than zero",
            ErrorContext::new().with_field_path(field),
        ));
    }
    Ok(())
}
