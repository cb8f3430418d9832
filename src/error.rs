use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "opensearch.endpoint", "results[3].index")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., response body excerpt)
    pub details: Option<String>,
    /// Source of the error (e.g., "opensearch", "bedrock_rerank", "config")
    pub source: Option<String>,
    /// HTTP status returned by the remote service, when there was one
    pub status: Option<u16>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
            status: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the retrieve-then-rerank pipeline.
///
/// Failures are grouped by the stage that produced them so callers can tell a
/// search outage from a rerank contract violation without parsing messages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Retrieval error: {message}{}", format_context(.context))]
    Retrieval {
        message: String,
        context: ErrorContext,
    },

    #[error("Rerank error: {message}{}", format_context(.context))]
    Rerank {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(status) = ctx.status {
        parts.push(format!("status: {}", status));
    }
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::retrieval_with_context(msg, ErrorContext::new())
    }

    /// Create a new retrieval error with structured context
    pub fn retrieval_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Retrieval {
            message: msg.into(),
            context,
        }
    }

    pub fn rerank(msg: impl Into<String>) -> Self {
        Self::rerank_with_context(msg, ErrorContext::new())
    }

    /// Create a new rerank error with structured context
    pub fn rerank_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Rerank {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Retrieval { context, .. }
            | Error::Rerank { context, .. }
            | Error::Configuration { context, .. }
            | Error::Validation { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status of the failed remote call, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        self.context().and_then(|c| c.status)
    }

    pub fn is_retrieval(&self) -> bool {
        matches!(self, Error::Retrieval { .. })
    }

    pub fn is_rerank(&self) -> bool {
        matches!(self, Error::Rerank { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}
