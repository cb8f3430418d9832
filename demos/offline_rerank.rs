//! Offline Rerank Example
//!
//! Runs the retrieve-then-rerank pipeline against in-memory stand-ins for
//! both services, so it needs no network access or AWS credentials:
//! - a keyword-overlap "search index"
//! - a "rerank model" that prefers shorter documents mentioning the query
//!
//! Usage:
//!   cargo run --example offline_rerank -- "solar wind"

use async_trait::async_trait;
use search_rerank::report;
use search_rerank::rerank::{RankedIndex, RerankRequest, RerankService, Reranker};
use search_rerank::retrieval::Retriever;
use search_rerank::{Document, SearchReranker};
use serde_json::json;
use std::sync::Arc;

struct KeywordIndex {
    documents: Vec<Document>,
}

#[async_trait]
impl Retriever for KeywordIndex {
    async fn search(&self, query: &str, size: usize) -> search_rerank::Result<Vec<Document>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let mut hits: Vec<Document> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let text = doc.text_of("full_text").to_lowercase();
                let score = terms.iter().filter(|t| text.contains(t.as_str())).count();
                (score > 0).then(|| Document::new(doc.id.clone(), score as f64, doc.fields.clone()))
            })
            .collect();
        hits.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        hits.truncate(size);
        Ok(hits)
    }
}

struct BrevityModel;

#[async_trait]
impl RerankService for BrevityModel {
    async fn rerank(&self, request: &RerankRequest) -> search_rerank::Result<Vec<RankedIndex>> {
        let mut scored: Vec<RankedIndex> = request
            .candidate_texts
            .iter()
            .enumerate()
            .map(|(i, text)| RankedIndex::new(i, 1.0 / (1.0 + text.len() as f64 / 40.0)))
            .collect();
        scored.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        scored.truncate(request.top_n);
        Ok(scored)
    }
}

fn corpus() -> Vec<Document> {
    [
        ("helio-1", "The solar wind is a stream of charged particles released from the Sun."),
        ("helio-2", "Solar flares and coronal mass ejections disturb the solar wind and Earth's magnetosphere."),
        ("earth-1", "Auroras appear when the wind of particles reaches the upper atmosphere."),
        ("misc-1", "Wind turbines convert the kinetic energy of moving air into electricity."),
        ("misc-2", "Solar panels convert sunlight into electricity."),
    ]
    .into_iter()
    .map(|(id, text)| {
        let fields = json!({ "full_text": text }).as_object().cloned().unwrap_or_default();
        Document::new(id, 0.0, fields)
    })
    .collect()
}

#[tokio::main]
async fn main() -> search_rerank::Result<()> {
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let query = if query.trim().is_empty() {
        "solar wind".to_string()
    } else {
        query
    };

    let pipeline = SearchReranker::new(
        Arc::new(KeywordIndex { documents: corpus() }),
        Reranker::new(Arc::new(BrevityModel)),
    );

    println!("=== Offline Rerank Demo ===\n");
    let output = pipeline.search_and_rerank(&query, 5, 3).await?;

    println!("Query: {}", output.query);
    println!("Search order:");
    for doc in &output.original_results {
        println!("  {} (score {:.1})", doc.id, doc.relevance_score);
    }
    println!();
    print!("{}", report::render_ranked(&output.reranked_results));
    Ok(())
}
