//! Cross-pool deduplication.

use std::collections::HashMap;

use prism_core::models::RetrievalResult;

use crate::search::SignalPool;

/// One result per `chunk_id` across all pools.
///
/// The first occurrence (pool order, then rank) provides the body. Later
/// occurrences fold their scores in field by field, and contribute metadata
/// keys the first did not have.
pub fn merge_pools(pools: &[SignalPool]) -> HashMap<String, RetrievalResult> {
    let mut merged: HashMap<String, RetrievalResult> = HashMap::new();
    for pool in pools {
        for result in &pool.results {
            match merged.get_mut(&result.chunk_id) {
                Some(existing) => {
                    existing.scores.merge(&result.scores);
                    for (key, value) in &result.metadata {
                        existing
                            .metadata
                            .entry(key.clone())
                            .or_insert_with(|| value.clone());
                    }
                    if existing.end.is_none() {
                        existing.end = result.end;
                    }
                    if existing.start.is_none() {
                        existing.start = result.start;
                    }
                }
                None => {
                    merged.insert(result.chunk_id.clone(), result.clone());
                }
            }
        }
    }
    merged
}
