//! Signed HTTP plumbing shared by the search and rerank clients.

mod http;

pub use http::{normalize_endpoint, HttpReply, SignedHttpClient, TransportError};

pub(crate) use http::append_path;
