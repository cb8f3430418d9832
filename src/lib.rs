//! # search-rerank
//!
//! Retrieve-then-rerank over hosted services: a lexical OpenSearch query
//! gathers candidates, a cross-encoder (Cohere Rerank on Amazon Bedrock)
//! re-scores them, and the response indices are joined back onto the
//! original hits.
//!
//! ## Overview
//!
//! - **Retrieval**: [`retrieval::Retriever`] returns scored [`Document`]s.
//! - **Rerank**: [`rerank::Reranker`] extracts one text field per document,
//!   calls a [`rerank::RerankService`], and maps the returned positions back
//!   to [`RerankResult`]s in the service's order.
//! - **Orchestration**: [`SearchReranker`] runs both stages for a query and
//!   returns a [`SearchAndRerankOutput`].
//!
//! Both remote services sit behind single-method traits, so tests and
//! offline tools can swap in in-memory fakes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_rerank::{auth::Credentials, config::Settings, SearchReranker};
//!
//! #[tokio::main]
//! async fn main() -> search_rerank::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let pipeline = SearchReranker::from_settings(&settings, Credentials::from_env()?)?;
//!
//!     let output = pipeline.search_and_rerank("solar wind", 100, 20).await?;
//!     for (rank, doc) in output.reranked_results.iter().enumerate() {
//!         println!("{}. {} ({:.4})", rank + 1, doc.id, doc.rerank_score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`retrieval`] | Search seam and the OpenSearch implementation |
//! | [`rerank`] | Rerank seam, Bedrock client, reconciliation |
//! | [`pipeline`] | Two-stage orchestration |
//! | [`auth`] | Credentials and SigV4 signing |
//! | [`config`] | File and environment settings |
//! | [`report`] | Console listing and JSON export |
//! | [`types`] | Shared data types |

pub mod auth;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod rerank;
pub mod retrieval;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use pipeline::SearchReranker;
pub use types::{Document, RerankResult, SearchAndRerankOutput, SearchQuery};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
