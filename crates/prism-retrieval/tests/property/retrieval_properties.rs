use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use proptest::prelude::*;

use prism_core::config::{FusionWeights, NeighborMergeConfig};
use prism_core::models::{RetrievalResult, Signal};
use prism_retrieval::expansion::tokens::tokenize;
use prism_retrieval::fusion::{min_max_normalize, reciprocal_rank_fusion, weighted_fusion};
use prism_retrieval::{FusionEngine, IntentClassifier, NeighborMerger, SignalPool, TokenCounter};

fn counter() -> Arc<TokenCounter> {
    static COUNTER: OnceLock<Arc<TokenCounter>> = OnceLock::new();
    Arc::clone(COUNTER.get_or_init(|| Arc::new(TokenCounter::new(1_000).unwrap())))
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        Just(Signal::Bm25),
        Just(Signal::Splade),
        Just(Signal::Dense),
        Just(Signal::Graph),
    ]
}

fn arb_pool() -> impl Strategy<Value = SignalPool> {
    (
        arb_signal(),
        prop::collection::vec(("c[0-9]{1,2}", -50.0f64..50.0), 0..20),
    )
        .prop_map(|(signal, entries)| {
            SignalPool::new(
                signal,
                entries
                    .into_iter()
                    .map(|(id, score)| RetrievalResult::new(id, "doc", "text").with_signal(signal, score))
                    .collect(),
            )
        })
}

fn arb_weights() -> impl Strategy<Value = FusionWeights> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_map(|(bm25, splade, dense, graph)| {
        FusionWeights {
            bm25,
            splade,
            dense,
            graph,
        }
    })
}

fn distinct_ids(pools: &[SignalPool]) -> HashSet<String> {
    pools
        .iter()
        .flat_map(|p| p.results.iter().map(|r| r.chunk_id.clone()))
        .collect()
}

// ── Normalization stays in the unit interval ──────────────────────────────

proptest! {
    #[test]
    fn normalized_scores_in_unit_interval(pool in arb_pool()) {
        let normalized = min_max_normalize(&pool);
        prop_assert_eq!(normalized.len(), pool.len());
        for value in normalized.values() {
            prop_assert!((0.0..=1.0).contains(value), "out of range: {}", value);
        }
        if !pool.is_empty() {
            prop_assert!(normalized.values().any(|v| *v == 1.0));
        }
    }
}

// ── Pools hold one entry per chunk, ranked by raw score ───────────────────

proptest! {
    #[test]
    fn pools_are_unique_and_ranked(pool in arb_pool()) {
        let scores: Vec<f64> = pool.scored().map(|(_, s)| s).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        let ids: HashSet<&str> = pool.scored().map(|(id, _)| id).collect();
        prop_assert_eq!(ids.len(), pool.len());
    }
}

// ── RRF is positive and bounded ───────────────────────────────────────────

proptest! {
    #[test]
    fn rrf_scores_positive_and_bounded(
        pools in prop::collection::vec(arb_pool(), 0..5),
        k in 1u32..200,
    ) {
        let fused = reciprocal_rank_fusion(&pools, k);
        prop_assert_eq!(fused.len(), distinct_ids(&pools).len());
        let bound = pools.len() as f64 / (k as f64 + 1.0);
        for score in fused.values() {
            prop_assert!(*score > 0.0);
            prop_assert!(*score <= bound + 1e-12);
        }
    }
}

// ── Weighted fusion never exceeds the total weight ────────────────────────

proptest! {
    #[test]
    fn weighted_scores_bounded_by_weight_sum(
        pools in prop::collection::vec(arb_pool(), 0..5),
        weights in arb_weights(),
    ) {
        let fused = weighted_fusion(&pools, &weights);
        let total: f64 = pools
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| weights.weight(p.signal))
            .sum();
        for score in fused.values() {
            prop_assert!(*score >= 0.0);
            prop_assert!(*score <= total + 1e-9);
        }
        if !fused.is_empty() {
            prop_assert_eq!(fused.len(), distinct_ids(&pools).len());
        }
    }
}

// ── Ranked output is sorted, unique, and fully fused ──────────────────────

proptest! {
    #[test]
    fn ranked_results_sorted_and_unique(
        pools in prop::collection::vec(arb_pool(), 0..5),
        weights in arb_weights(),
    ) {
        let engine = FusionEngine::new(weights, 60);
        let (_, results) = engine.rank(&pools, false);

        prop_assert_eq!(results.len(), distinct_ids(&pools).len());
        let ids: HashSet<&str> = results.iter().map(|r| r.chunk_id.as_str()).collect();
        prop_assert_eq!(ids.len(), results.len());
        prop_assert!(results.iter().all(|r| r.scores.fused == Some(r.score)));
        for pair in results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.score > b.score || (a.score == b.score && a.chunk_id < b.chunk_id),
                "{}:{} before {}:{}", a.chunk_id, a.score, b.chunk_id, b.score
            );
        }
    }
}

// ── Neighbor merge never crosses documents and loses no chunk ─────────────

fn arb_ranked_results() -> impl Strategy<Value = Vec<RetrievalResult>> {
    prop::collection::vec((0usize..3, prop::option::of(0.5f64..1.0)), 0..15).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (doc, cosine))| {
                let result = RetrievalResult::new(format!("c{i}"), format!("d{doc}"), format!("chunk {i}"));
                match cosine {
                    Some(c) => result.with_metadata("cosine", c),
                    None => result,
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn merge_stays_within_one_document(results in arb_ranked_results()) {
        let merger = NeighborMerger::with_counter(NeighborMergeConfig::default(), counter());
        let input: Vec<(String, String)> = results
            .iter()
            .map(|r| (r.chunk_id.clone(), r.doc_id.clone()))
            .collect();
        let merged = merger.merge(results);

        let mut covered = 0;
        for result in &merged {
            match result.metadata.get("merged_chunk_ids").and_then(|v| v.as_array()) {
                Some(members) => {
                    prop_assert!(members.len() > 1);
                    prop_assert_eq!(members[0].as_str(), Some(result.chunk_id.as_str()));
                    for member in members {
                        let id = member.as_str().unwrap();
                        let doc = &input.iter().find(|(c, _)| c == id).unwrap().1;
                        prop_assert_eq!(doc, &result.doc_id);
                    }
                    covered += members.len();
                }
                None => covered += 1,
            }
        }
        prop_assert_eq!(covered, input.len());
    }
}

// ── Intent detection always resolves ──────────────────────────────────────

proptest! {
    #[test]
    fn every_query_gets_a_known_intent(query in "\\PC{0,60}") {
        let classifier = IntentClassifier::new(prism_retrieval::intent::rules::default_rules()).unwrap();
        let intent = classifier.detect(&query);
        prop_assert!(classifier.intents().contains(&intent));
    }
}

// ── Tokens are trimmed and non-empty ──────────────────────────────────────

proptest! {
    #[test]
    fn tokens_are_trimmed(query in "[a-zA-Z0-9 ,.()\\-]{0,80}") {
        for token in tokenize(&query) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.starts_with('-') && !token.ends_with('-'));
            prop_assert!(token.chars().all(|c| c.is_alphanumeric() || c == '-'));
        }
    }
}
