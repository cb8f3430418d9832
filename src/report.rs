//! Console rendering and JSON export of pipeline output.

use crate::types::{Fields, RerankResult, SearchAndRerankOutput};
use crate::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Number of characters of the field map shown per result.
pub const PREVIEW_CHARS: usize = 200;

/// First `max_chars` characters of the field map's JSON text.
pub fn preview(fields: &Fields, max_chars: usize) -> String {
    serde_json::Value::Object(fields.clone())
        .to_string()
        .chars()
        .take(max_chars)
        .collect()
}

/// Numbered listing of reranked results for a terminal.
pub fn render_ranked(results: &[RerankResult]) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "RERANKED RESULTS");
    let _ = writeln!(out, "{}", rule);
    if results.is_empty() {
        let _ = writeln!(out, "\n(no results)");
    }
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(out, "\n{}. Document ID: {}", rank + 1, result.id);
        let _ = writeln!(out, "   Rerank Score: {:.4}", result.rerank_score);
        let _ = writeln!(out, "   Original Score: {:.4}", result.original_score);
        let _ = writeln!(
            out,
            "   Content Preview: {}...",
            preview(&result.fields, PREVIEW_CHARS)
        );
    }
    out
}

/// Write `output` as pretty-printed JSON to `path`.
pub fn write_json(path: &Path, output: &SearchAndRerankOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json)?;
    Ok(())
}
