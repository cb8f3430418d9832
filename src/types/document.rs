//! Retrieved documents and search queries.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

/// Schemaless field map as returned by the search service.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque, index-assigned identifier.
    pub id: String,
    /// Score assigned by the search service.
    pub relevance_score: f64,
    /// Source fields exactly as stored in the index.
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, relevance_score: f64, fields: Fields) -> Self {
        Self {
            id: id.into(),
            relevance_score,
            fields,
        }
    }

    /// Text of `field` suitable for a rerank candidate.
    ///
    /// Strings are returned untouched. A missing or null field yields an empty
    /// string; any other JSON value is rendered as its JSON text.
    pub fn text_of(&self, field: &str) -> String {
        match self.fields.get(field) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// A free-text query and the number of hits requested for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub requested_count: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, requested_count: usize) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::validation_with_context(
                "Search query must not be empty",
                ErrorContext::new().with_field_path("query"),
            ));
        }
        if requested_count == 0 {
            return Err(Error::validation_with_context(
                "Requested result count must be positive",
                ErrorContext::new().with_field_path("size"),
            ));
        }
        Ok(Self {
            text,
            requested_count,
        })
    }
}
