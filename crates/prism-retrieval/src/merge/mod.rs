//! Neighbor consolidation and relationship filtering.
//!
//! The merger walks the ranked list left to right. A result is eligible when
//! its `metadata["cosine"]` is at least `min_cosine`. A run starts at an
//! eligible result and absorbs following results while they are eligible,
//! share the head's `doc_id`, and keep the run within `max_tokens`.

pub mod tokens;

use std::sync::Arc;

use serde_json::Value;

use prism_core::config::NeighborMergeConfig;
use prism_core::errors::PrismResult;
use prism_core::models::{metadata_keys, RetrievalResult};

pub use tokens::TokenCounter;

const TOKEN_CACHE_CAPACITY: u64 = 10_000;

struct Run {
    head: RetrievalResult,
    texts: Vec<String>,
    chunk_ids: Vec<String>,
    last_end: Option<u64>,
    tokens: usize,
}

impl Run {
    fn start(head: RetrievalResult, tokens: usize) -> Self {
        Self {
            texts: vec![head.text.clone()],
            chunk_ids: vec![head.chunk_id.clone()],
            last_end: head.end,
            tokens,
            head,
        }
    }

    fn push(&mut self, member: RetrievalResult, tokens: usize) {
        self.tokens += tokens;
        if member.end.is_some() {
            self.last_end = member.end;
        }
        self.chunk_ids.push(member.chunk_id);
        self.texts.push(member.text);
    }

    fn finish(self, separator: &str) -> RetrievalResult {
        let mut head = self.head;
        if self.chunk_ids.len() == 1 {
            return head;
        }
        head.text = self.texts.join(separator);
        head.end = self.last_end.or(head.end);
        head.metadata.insert(
            metadata_keys::MERGED_CHUNK_IDS.to_string(),
            Value::from(self.chunk_ids),
        );
        head
    }
}

pub struct NeighborMerger {
    config: NeighborMergeConfig,
    counter: Arc<TokenCounter>,
}

impl NeighborMerger {
    pub fn new(config: NeighborMergeConfig) -> PrismResult<Self> {
        let counter = TokenCounter::new(TOKEN_CACHE_CAPACITY)?;
        Ok(Self::with_counter(config, Arc::new(counter)))
    }

    pub fn with_counter(config: NeighborMergeConfig, counter: Arc<TokenCounter>) -> Self {
        Self { config, counter }
    }

    pub fn config(&self) -> &NeighborMergeConfig {
        &self.config
    }

    fn is_eligible(&self, result: &RetrievalResult) -> bool {
        result
            .cosine()
            .is_some_and(|c| c.is_finite() && c >= self.config.min_cosine)
    }

    /// Consolidate adjacent same-document chunks. Merged results keep the head's
    /// identity and scores; their text joins the run with the separator.
    pub fn merge(&self, results: Vec<RetrievalResult>) -> Vec<RetrievalResult> {
        let input_len = results.len();
        let mut merged: Vec<RetrievalResult> = Vec::with_capacity(input_len);
        let mut run: Option<Run> = None;

        for result in results {
            let eligible = self.is_eligible(&result);
            let tokens = if eligible {
                self.counter.count_cached(&result.text)
            } else {
                0
            };

            if let Some(current) = run.as_mut() {
                if eligible
                    && result.doc_id == current.head.doc_id
                    && current.tokens + tokens <= self.config.max_tokens
                {
                    current.push(result, tokens);
                    continue;
                }
            }
            if let Some(done) = run.take() {
                merged.push(done.finish(&self.config.separator));
            }

            if eligible {
                run = Some(Run::start(result, tokens));
            } else {
                merged.push(result);
            }
        }
        if let Some(done) = run.take() {
            merged.push(done.finish(&self.config.separator));
        }

        if merged.len() < input_len {
            tracing::debug!(
                before = input_len,
                after = merged.len(),
                "neighbor merge consolidated chunks"
            );
        }
        merged
    }
}

/// Drop results whose relationship tag is set and not in `allowed`.
/// Untagged results always pass.
pub fn filter_by_relationship(
    results: Vec<RetrievalResult>,
    allowed: &[String],
) -> Vec<RetrievalResult> {
    results
        .into_iter()
        .filter(|r| match r.relationship() {
            Some(rel) => allowed.iter().any(|a| a == rel),
            None => true,
        })
        .collect()
}
