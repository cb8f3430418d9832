//! Credentials and AWS Signature Version 4 request signing.
//!
//! Both hosted services (OpenSearch Serverless and Bedrock) authenticate with
//! SigV4. Credentials are always passed in explicitly; only the binary reads
//! them from the process environment via [`Credentials::from_env`].

mod sigv4;

pub use sigv4::{SignedHeaders, SigV4Signer};

pub(crate) use sigv4::uri_encode;

use crate::{Error, ErrorContext, Result};
use std::fmt;

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
    /// `AWS_SESSION_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Credentials::from_env`] but with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let access_key_id = non_empty("AWS_ACCESS_KEY_ID").ok_or_else(|| missing("AWS_ACCESS_KEY_ID"))?;
        let secret_access_key =
            non_empty("AWS_SECRET_ACCESS_KEY").ok_or_else(|| missing("AWS_SECRET_ACCESS_KEY"))?;
        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: non_empty("AWS_SESSION_TOKEN"),
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.access_key_id.trim().is_empty() {
            return Err(missing("access_key_id"));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(missing("secret_access_key"));
        }
        Ok(())
    }
}

fn missing(key: &str) -> Error {
    Error::configuration_with_context(
        "AWS credentials are missing",
        ErrorContext::new()
            .with_field_path(key)
            .with_source("credentials"),
    )
}

// Keep secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
