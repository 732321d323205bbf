//! Structured log events for the retrieval pipeline.
//!
//! Each function emits one `tracing` event with structured fields.

pub fn signal_failed(signal: &str, error: &str) {
    tracing::warn!(
        event = "signal_failed",
        signal = %signal,
        error = %error,
        "retrieval signal failed"
    );
}

/// Weighted fusion was degenerate and RRF ran instead.
pub fn fusion_fallback(non_empty_pools: usize, rrf_k: u32) {
    tracing::warn!(
        event = "fusion_fallback",
        non_empty_pools = non_empty_pools,
        rrf_k = rrf_k,
        "weighted fusion degenerate, using reciprocal rank fusion"
    );
}

pub fn rerank_failed(error: &str) {
    tracing::warn!(
        event = "rerank_failed",
        error = %error,
        "reranker failed, keeping fused order"
    );
}

pub fn expansion_failed(token: &str, error: &str) {
    tracing::warn!(
        event = "expansion_failed",
        token = %token,
        error = %error,
        "concept catalog lookup failed"
    );
}

pub fn slo_exceeded(latency_ms: f64, slo_ms: u64) {
    tracing::warn!(
        event = "slo_exceeded",
        latency_ms = latency_ms,
        slo_ms = slo_ms,
        "retrieval latency exceeded SLO"
    );
}

pub fn cache_hit(cache: &str) {
    tracing::debug!(event = "cache_hit", cache = %cache, "cache hit");
}

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn retrieval_completed(intent: &str, results: usize, latency_ms: f64, fusion: &str) {
    tracing::info!(
        event = "retrieval_completed",
        intent = %intent,
        results = results,
        latency_ms = latency_ms,
        fusion = %fusion,
        "retrieval completed"
    );
}
