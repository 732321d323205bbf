//! One async function per retrieval signal.
//!
//! Each branch returns its own result so a failure never aborts its siblings.
//! Timing and error recording happen in the service.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use prism_cache::{content_key, TtlCache};
use prism_core::errors::{BackendError, PrismResult};
use prism_core::models::{metadata_keys, RetrievalResult, Signal};
use prism_core::traits::{IEmbedder, ILexicalSearch, ISparseEncoder, IVectorSearch};
use prism_observability::tracing_setup::events;

use super::query_body::sparse_body;
use super::SignalPool;

/// BM25 over the lexical index.
pub async fn bm25(
    lexical: &dyn ILexicalSearch,
    index: &str,
    body: &Value,
    size: usize,
) -> PrismResult<SignalPool> {
    let hits = lexical.search(index, body, size).await?;
    Ok(SignalPool::from_hits(Signal::Bm25, hits))
}

/// Encode the query, then search the sparse index through the lexical client.
pub async fn splade(
    encoder: &dyn ISparseEncoder,
    lexical: &dyn ILexicalSearch,
    index: &str,
    query: &str,
    filters: &BTreeMap<String, Value>,
    size: usize,
) -> PrismResult<SignalPool> {
    let terms: HashMap<String, f32> = encoder.expand(query).await?;
    let Some(body) = sparse_body(&terms, filters) else {
        tracing::debug!("sparse encoder produced no usable terms");
        return Ok(SignalPool::empty(Signal::Splade));
    };
    let hits = lexical.search(index, &body, size).await?;
    Ok(SignalPool::from_hits(Signal::Splade, hits))
}

/// Embed the query (through the embedding cache) and run a vector search.
pub async fn dense(
    embedder: &dyn IEmbedder,
    vector: &dyn IVectorSearch,
    cache: &TtlCache<String, Vec<f32>>,
    index: &str,
    query: &str,
    size: usize,
) -> PrismResult<SignalPool> {
    let key = content_key(query);
    let embedding = match cache.get(&key) {
        Some(embedding) => {
            events::cache_hit("embedding");
            embedding
        }
        None => {
            let embedding = embedder.embed(query).await?;
            cache.insert(key, embedding.clone());
            embedding
        }
    };
    let hits = vector.query(index, &embedding, size).await?;
    Ok(SignalPool::from_hits(Signal::Dense, hits))
}

/// Lexical search over every granularity index concurrently.
///
/// Hits are tagged with their granularity; a chunk found at several
/// granularities keeps its best-scored hit. The branch fails only when every
/// index fails.
pub async fn graph(
    lexical: Arc<dyn ILexicalSearch>,
    indexes: &BTreeMap<String, String>,
    body: &Value,
    size: usize,
) -> PrismResult<SignalPool> {
    let searches = indexes.iter().map(|(granularity, index)| {
        let lexical = Arc::clone(&lexical);
        async move {
            let hits = lexical.search(index, body, size).await;
            (granularity, hits)
        }
    });
    let responses = join_all(searches).await;

    let mut results: Vec<RetrievalResult> = Vec::new();
    let mut failures: Vec<String> = Vec::new();
    for (granularity, response) in responses {
        match response {
            Ok(hits) => {
                let pool = SignalPool::from_hits(Signal::Graph, hits);
                results.extend(pool.results.into_iter().map(|r| {
                    r.with_metadata(metadata_keys::GRANULARITY, granularity.clone())
                }));
            }
            Err(e) => {
                events::signal_failed(&format!("graph:{granularity}"), &e.to_string());
                failures.push(format!("{granularity}: {e}"));
            }
        }
    }

    if !indexes.is_empty() && failures.len() == indexes.len() {
        return Err(BackendError::Unavailable {
            backend: "graph".to_string(),
            reason: failures.join("; "),
        }
        .into());
    }
    // Pool construction sorts by score and keeps the first of each chunk_id.
    Ok(SignalPool::new(Signal::Graph, results))
}
