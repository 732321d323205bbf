use prism_core::config::RetrieverConfig;
use prism_core::models::*;
use serde_json::json;

// --- Request normalization ---

#[test]
fn normalize_fills_defaults() {
    let config = RetrieverConfig::default();
    let normalized = RetrievalRequest::new("  pembrolizumab  ").normalize(&config);
    assert_eq!(normalized.query, "pembrolizumab");
    assert_eq!(normalized.top_k, config.default_top_k);
    assert_eq!(normalized.from_, 0);
    assert!(normalized.filters.is_empty());
    assert!(normalized.intent.is_none());
    assert!(normalized.rerank_enabled.is_none());
}

#[test]
fn normalize_clamps_top_k_into_bounds() {
    let config = RetrieverConfig::default();
    assert_eq!(RetrievalRequest::new("q").with_top_k(0).normalize(&config).top_k, 1);
    assert_eq!(RetrievalRequest::new("q").with_top_k(-3).normalize(&config).top_k, 1);
    assert_eq!(
        RetrievalRequest::new("q").with_top_k(10_000).normalize(&config).top_k,
        config.max_top_k
    );
    assert_eq!(RetrievalRequest::new("q").with_top_k(7).normalize(&config).top_k, 7);
}

#[test]
fn normalize_clamps_negative_offset() {
    let config = RetrieverConfig::default();
    let normalized = RetrievalRequest::new("q").with_from(-5).normalize(&config);
    assert_eq!(normalized.from_, 0);
}

#[test]
fn window_saturates_for_huge_offsets() {
    let config = RetrieverConfig::default();
    let normalized = RetrievalRequest::new("q")
        .with_top_k(10)
        .with_from(i64::MAX)
        .normalize(&config);
    assert_eq!(normalized.from_ as u64, i64::MAX as u64);
    assert_eq!(normalized.window(), normalized.from_ + 10);

    let at_edge = NormalizedRequest {
        from_: usize::MAX,
        ..normalized
    };
    assert_eq!(at_edge.window(), usize::MAX);
}

#[test]
fn normalize_drops_null_filters() {
    let config = RetrieverConfig::default();
    let request: RetrievalRequest = serde_json::from_value(json!({
        "query": "q",
        "filters": { "doc_type": "trial", "phase": null }
    }))
    .unwrap();
    let normalized = request.normalize(&config);
    assert_eq!(normalized.filters.len(), 1);
    assert_eq!(normalized.filters.get("doc_type"), Some(&json!("trial")));
}

#[test]
fn normalize_ignores_blank_intent_override() {
    let config = RetrieverConfig::default();
    let normalized = RetrievalRequest::new("q").with_intent("   ").normalize(&config);
    assert!(normalized.intent.is_none());
}

#[test]
fn request_accepts_camel_case_top_k_and_from() {
    let request: RetrievalRequest = serde_json::from_value(json!({
        "query": "q",
        "topK": 4,
        "from": 2,
        "rerank_enabled": true,
        "explain": true
    }))
    .unwrap();
    assert_eq!(request.top_k, Some(4));
    assert_eq!(request.from_, Some(2));
    assert_eq!(request.rerank_enabled, Some(true));
    assert!(request.explain);

    let snake: RetrievalRequest =
        serde_json::from_value(json!({ "query": "q", "top_k": 3, "from_": 1 })).unwrap();
    assert_eq!(snake.top_k, Some(3));
    assert_eq!(snake.from_, Some(1));
}

// --- Scores ---

#[test]
fn scores_merge_keeps_fields_from_both_sides() {
    let mut a = RetrieverScores::for_signal(Signal::Bm25, 4.2);
    let b = RetrieverScores::for_signal(Signal::Dense, 0.91);
    a.merge(&b);
    assert_eq!(a.bm25, Some(4.2));
    assert_eq!(a.dense, Some(0.91));
    assert_eq!(a.contributing_signals(), vec![Signal::Bm25, Signal::Dense]);
}

#[test]
fn scores_merge_keeps_max_on_collision() {
    let mut a = RetrieverScores::for_signal(Signal::Graph, 1.0);
    a.merge(&RetrieverScores::for_signal(Signal::Graph, 3.0));
    assert_eq!(a.graph, Some(3.0));
    a.merge(&RetrieverScores::for_signal(Signal::Graph, 2.0));
    assert_eq!(a.graph, Some(3.0));
}

#[test]
fn absent_scores_are_not_serialized() {
    let scores = RetrieverScores::for_signal(Signal::Splade, 0.5);
    let value = serde_json::to_value(scores).unwrap();
    assert_eq!(value, json!({ "splade": 0.5 }));
}

// --- Results ---

#[test]
fn result_metadata_accessors() {
    let result = RetrievalResult::new("c1", "d1", "text")
        .with_metadata("cosine", 0.93)
        .with_metadata("relationship", "supports")
        .with_metadata("granularity", "section");
    assert_eq!(result.cosine(), Some(0.93));
    assert_eq!(result.relationship(), Some("supports"));
    assert_eq!(result.granularity(), Some("section"));
}

#[test]
fn set_fused_updates_display_score() {
    let mut result = RetrievalResult::new("c1", "d1", "text").with_signal(Signal::Bm25, 7.0);
    result.set_fused(0.8);
    assert_eq!(result.score, 0.8);
    assert_eq!(result.scores.fused, Some(0.8));
    assert_eq!(result.scores.bm25, Some(7.0));
}

// --- Transport view ---

#[test]
fn api_response_carries_query_meta() {
    let mut metadata = Metadata::new();
    metadata.insert("feature_flags".into(), json!({ "rerank": false }));
    let response = RetrievalResponse {
        results: vec![RetrievalResult::new("c1", "d1", "text")],
        timings: vec![RetrieverTiming::new("bm25", 3.5)],
        expanded_terms: [("keytruda".to_string(), 0.9)].into_iter().collect(),
        intent: "general".into(),
        latency_ms: 12.0,
        from_: 0,
        size: 4,
        metadata,
    };
    assert_eq!(response.timing("bm25"), Some(3.5));

    let api = ApiResponse::from(response);
    assert_eq!(api.results.len(), 1);
    assert_eq!(api.query_meta.intent_detected, "general");
    assert_eq!(api.query_meta.expanded_terms.get("keytruda"), Some(&0.9));
    assert_eq!(api.query_meta.feature_flags, json!({ "rerank": false }));

    let body = serde_json::to_value(&api).unwrap();
    assert!(body["query_meta"]["intent_detected"].is_string());
}
