//! Reranking of the head of the fused list.
//!
//! The top `top_n` results go to the reranker and the reordered head is
//! spliced back in front of the untouched tail. On failure the original
//! order is kept.

use std::collections::HashSet;

use tracing::Instrument;

use prism_core::models::RetrievalResult;
use prism_core::traits::IReranker;
use prism_observability::rerank_span;
use prism_observability::tracing_setup::events;

#[derive(Debug, Clone)]
pub struct RerankOutcome {
    pub results: Vec<RetrievalResult>,
    /// Set when the reranker failed and the fused order was kept.
    pub error: Option<String>,
    /// Number of results sent to the reranker.
    pub reranked: usize,
}

/// Rerank the first `top_n` of `results`.
///
/// Returned items are matched back to the head by `chunk_id`: unknown or
/// repeated ids are ignored, and head items the reranker dropped follow the
/// reranked ones in their original order. The display score stays the fused
/// score; `scores.rerank` carries the reranker's score.
pub async fn rerank_head(
    reranker: &dyn IReranker,
    query: &str,
    mut results: Vec<RetrievalResult>,
    top_n: usize,
) -> RerankOutcome {
    let n = top_n.min(results.len());
    if n == 0 {
        return RerankOutcome {
            results,
            error: None,
            reranked: 0,
        };
    }

    let tail = results.split_off(n);
    let head = results;

    let response = reranker
        .rerank(query, head.clone())
        .instrument(rerank_span!(n))
        .await;

    let reordered = match response {
        Ok(reordered) => reordered,
        Err(e) => {
            events::rerank_failed(&e.to_string());
            let mut results = head;
            results.extend(tail);
            return RerankOutcome {
                results,
                error: Some(e.to_string()),
                reranked: 0,
            };
        }
    };

    let mut spliced: Vec<RetrievalResult> = Vec::with_capacity(n + tail.len());
    let mut placed: HashSet<String> = HashSet::with_capacity(n);
    for item in reordered {
        let Some(original) = head.iter().find(|h| h.chunk_id == item.chunk_id) else {
            continue;
        };
        if !placed.insert(item.chunk_id.clone()) {
            continue;
        }
        let mut result = original.clone();
        result.scores.rerank = item.scores.rerank.or(Some(item.score));
        spliced.push(result);
    }
    spliced.extend(head.into_iter().filter(|h| !placed.contains(&h.chunk_id)));
    spliced.extend(tail);

    RerankOutcome {
        results: spliced,
        error: None,
        reranked: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prism_core::errors::{BackendError, PrismResult};

    /// Returns a fixed id order, scoring by position.
    struct Scripted(Vec<&'static str>);

    #[async_trait]
    impl IReranker for Scripted {
        async fn rerank(
            &self,
            _query: &str,
            _candidates: Vec<RetrievalResult>,
        ) -> PrismResult<Vec<RetrievalResult>> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(i, id)| {
                    let mut r = RetrievalResult::new(*id, "d", "");
                    r.score = 10.0 - i as f64;
                    r
                })
                .collect())
        }
    }

    struct Broken;

    #[async_trait]
    impl IReranker for Broken {
        async fn rerank(
            &self,
            _query: &str,
            _candidates: Vec<RetrievalResult>,
        ) -> PrismResult<Vec<RetrievalResult>> {
            Err(BackendError::Timeout {
                backend: "reranker".to_string(),
                elapsed_ms: 250,
            }
            .into())
        }
    }

    fn ranked(ids: &[&str]) -> Vec<RetrievalResult> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let mut r = RetrievalResult::new(*id, "d", format!("text {id}"));
                r.set_fused(1.0 - i as f64 * 0.1);
                r
            })
            .collect()
    }

    fn ids(results: &[RetrievalResult]) -> Vec<&str> {
        results.iter().map(|r| r.chunk_id.as_str()).collect()
    }

    #[tokio::test]
    async fn splices_head_before_tail() {
        let outcome = rerank_head(&Scripted(vec!["b", "a"]), "q", ranked(&["a", "b", "c"]), 2).await;
        assert_eq!(ids(&outcome.results), vec!["b", "a", "c"]);
        assert_eq!(outcome.reranked, 2);
        assert!(outcome.error.is_none());
        // Originals are kept; the reranker's text is not.
        assert_eq!(outcome.results[0].text, "text b");
        assert_eq!(outcome.results[0].scores.rerank, Some(10.0));
        assert!((outcome.results[0].score - 0.9).abs() < 1e-9);
        assert_eq!(outcome.results[2].scores.rerank, None);
    }

    #[tokio::test]
    async fn unknown_repeated_and_dropped_ids() {
        let reranker = Scripted(vec!["zz", "c", "c"]);
        let outcome = rerank_head(&reranker, "q", ranked(&["a", "b", "c", "d"]), 3).await;
        assert_eq!(ids(&outcome.results), vec!["c", "a", "b", "d"]);
    }

    #[tokio::test]
    async fn failure_keeps_fused_order() {
        let outcome = rerank_head(&Broken, "q", ranked(&["a", "b", "c"]), 2).await;
        assert_eq!(ids(&outcome.results), vec!["a", "b", "c"]);
        assert_eq!(outcome.reranked, 0);
        assert!(outcome.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn zero_top_n_is_a_no_op() {
        let outcome = rerank_head(&Broken, "q", ranked(&["a", "b"]), 0).await;
        assert_eq!(ids(&outcome.results), vec!["a", "b"]);
        assert!(outcome.error.is_none());
    }
}
