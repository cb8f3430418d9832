//! Core data types shared by the retrieval and rerank stages.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | A search hit: opaque id, retrieval score, schemaless fields |
//! | [`SearchQuery`] | Validated free-text query plus requested hit count |
//! | [`RerankResult`] | A document joined back from a rerank response entry |
//! | [`SearchAndRerankOutput`] | Query, original hits and reranked hits of one round trip |
//!
//! Retrieval scores and rerank scores come from different models and are not
//! comparable; both are carried side by side on [`RerankResult`].

pub mod document;
pub mod result;

pub use document::{Document, Fields, SearchQuery};
pub use result::{RerankResult, SearchAndRerankOutput};
