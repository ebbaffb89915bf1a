//! Fuzzy field matching against schemaless usage documents.
//!
//! A document is flattened into scalar leaves, every leaf path is scored
//! against the query, and the best-scoring leaf wins. Ties go to the leaf
//! seen first in document order.

pub mod flatten;
pub mod score;

pub use flatten::{flatten, FlatEntry};
pub use score::{expand_numbers, score, EXACT_SCORE};

use crate::error::{LimitsError, Result};
use serde_json::Value;

/// The winning entry for a query together with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub entry: &'a FlatEntry,
    pub score: u32,
}

/// Finds the entry whose path best matches `query` (case-insensitive).
pub fn find_best_match<'a>(entries: &'a [FlatEntry], query: &str) -> Result<Match<'a>> {
    let query_lower = query.to_lowercase();
    let mut best: Option<Match<'a>> = None;

    for entry in entries {
        let score = score(&query_lower, &entry.path.to_lowercase());
        if score > best.map_or(0, |m| m.score) {
            best = Some(Match { entry, score });
        }
    }

    best.ok_or_else(|| LimitsError::NoMatch {
        query: query.to_string(),
    })
}

/// Flattens `document` and returns a copy of the best match for `query`.
pub fn lookup(document: &Value, query: &str) -> Result<FlatEntry> {
    let entries = flatten(document);
    let found = find_best_match(&entries, query)?;
    Ok(found.entry.clone())
}
