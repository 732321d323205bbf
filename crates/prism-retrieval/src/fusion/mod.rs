//! Score fusion across signal pools.
//!
//! Weighted fusion min-max normalizes each pool, scales it by the signal
//! weight, and sums per `chunk_id`. When that is degenerate (every pool empty,
//! or zero total weight over the non-empty pools) while some pool has results,
//! reciprocal rank fusion runs instead: score = Σ 1/(k + rank).

pub mod dedup;
pub mod explain;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use prism_core::config::FusionWeights;
use prism_core::models::{metadata_keys, RetrievalResult};
use prism_observability::tracing_setup::events;

use crate::search::SignalPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
    Weighted,
    Rrf,
    /// Every pool was empty.
    Empty,
}

impl FusionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Rrf => "rrf",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for FusionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fused scores and the method that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub method: FusionMethod,
    pub scores: HashMap<String, f64>,
}

/// Min-max scale a pool's raw scores into [0, 1].
///
/// A constant pool maps every entry to 1.0. Non-finite scores are ignored.
pub fn min_max_normalize(pool: &SignalPool) -> HashMap<String, f64> {
    let scored: Vec<(&str, f64)> = pool.scored().filter(|(_, s)| s.is_finite()).collect();
    let Some(min) = scored.iter().map(|(_, s)| *s).reduce(f64::min) else {
        return HashMap::new();
    };
    let max = scored.iter().map(|(_, s)| *s).fold(min, f64::max);
    let range = max - min;

    scored
        .into_iter()
        .map(|(id, s)| {
            let normalized = if range > 0.0 { (s - min) / range } else { 1.0 };
            (id.to_string(), normalized)
        })
        .collect()
}

/// Weighted sum of normalized pool scores. Empty when degenerate.
///
/// Every chunk of every non-empty pool gets an entry, so zero-weight pools
/// contribute 0.0 rather than vanishing.
pub fn weighted_fusion(pools: &[SignalPool], weights: &FusionWeights) -> HashMap<String, f64> {
    let non_empty: Vec<&SignalPool> = pools.iter().filter(|p| !p.is_empty()).collect();
    let total_weight: f64 = non_empty.iter().map(|p| weights.weight(p.signal)).sum();
    if non_empty.is_empty() || total_weight <= 0.0 || !total_weight.is_finite() {
        return HashMap::new();
    }

    let mut fused: HashMap<String, f64> = HashMap::new();
    for pool in non_empty {
        let weight = weights.weight(pool.signal);
        for (chunk_id, normalized) in min_max_normalize(pool) {
            *fused.entry(chunk_id).or_default() += normalized * weight;
        }
    }
    fused
}

/// Reciprocal rank fusion: each occurrence at 1-indexed rank r adds 1/(k + r).
pub fn reciprocal_rank_fusion(pools: &[SignalPool], k: u32) -> HashMap<String, f64> {
    let mut fused: HashMap<String, f64> = HashMap::new();
    for pool in pools {
        for (rank, (chunk_id, _)) in pool.scored().enumerate() {
            let rrf = 1.0 / (k as f64 + (rank + 1) as f64);
            *fused.entry(chunk_id.to_string()).or_default() += rrf;
        }
    }
    fused
}

/// Sort by score descending, `chunk_id` ascending on ties.
pub fn sort_results(results: &mut [RetrievalResult]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
}

#[derive(Debug, Clone)]
pub struct FusionEngine {
    weights: FusionWeights,
    rrf_k: u32,
}

impl FusionEngine {
    pub fn new(weights: FusionWeights, rrf_k: u32) -> Self {
        Self {
            weights,
            rrf_k: rrf_k.max(1),
        }
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }

    /// Weighted fusion, falling back to RRF when it is degenerate.
    pub fn fuse(&self, pools: &[SignalPool]) -> FusionOutcome {
        let non_empty = pools.iter().filter(|p| !p.is_empty()).count();
        if non_empty == 0 {
            return FusionOutcome {
                method: FusionMethod::Empty,
                scores: HashMap::new(),
            };
        }

        let weighted = weighted_fusion(pools, &self.weights);
        if !weighted.is_empty() {
            return FusionOutcome {
                method: FusionMethod::Weighted,
                scores: weighted,
            };
        }

        events::fusion_fallback(non_empty, self.rrf_k);
        FusionOutcome {
            method: FusionMethod::Rrf,
            scores: reciprocal_rank_fusion(pools, self.rrf_k),
        }
    }

    /// Deduplicate, fuse, and rank. Every returned result has `scores.fused` set.
    pub fn rank(&self, pools: &[SignalPool], explain: bool) -> (FusionMethod, Vec<RetrievalResult>) {
        let outcome = self.fuse(pools);
        let mut explanations = if explain {
            explain::explanations(pools, outcome.method)
        } else {
            HashMap::new()
        };

        let mut results: Vec<RetrievalResult> = dedup::merge_pools(pools)
            .into_iter()
            .map(|(chunk_id, mut result)| {
                let score = outcome.scores.get(&chunk_id).copied().unwrap_or(0.0);
                result.set_fused(score);
                if let Some(explanation) = explanations.remove(&chunk_id) {
                    result
                        .metadata
                        .insert(metadata_keys::EXPLAIN.to_string(), explanation);
                }
                result
            })
            .collect();
        sort_results(&mut results);

        tracing::debug!(
            method = %outcome.method,
            results = results.len(),
            "fusion complete"
        );
        (outcome.method, results)
    }
}
