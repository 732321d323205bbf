use prism_core::config::*;
use prism_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = RetrieverConfig::from_toml("").unwrap();

    assert_eq!(config.bm25_index, "chunks_bm25");
    assert_eq!(config.splade_index, "chunks_splade");
    assert_eq!(config.dense_index, "chunks_dense");
    assert_eq!(config.max_top_k, 50);
    assert_eq!(config.default_top_k, 10);
    assert_eq!(config.rrf_k, 60);
    assert_eq!(config.rerank_top_n, 20);
    assert!(!config.rerank_enabled);
    assert_eq!(config.slo_ms, 800);

    assert_eq!(config.weights.bm25, 0.35);
    assert_eq!(config.weights.splade, 0.25);
    assert_eq!(config.weights.dense, 0.40);

    assert_eq!(config.neighbor_merge.min_cosine, 0.85);
    assert_eq!(config.neighbor_merge.max_tokens, 512);

    assert_eq!(config.cache.query_cache_seconds, 60);
    assert_eq!(config.cache.embedding_cache_seconds, 3_600);
    assert_eq!(config.cache.expansion_cache_seconds, 600);

    assert!(!config.multi_granularity.enabled);
    assert!(config.intent_rules.is_none());
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
max_top_k = 100
slo_ms = 250

[weights]
bm25 = 0.6
splade = 0.4

[multi_granularity]
enabled = true

[multi_granularity.indexes]
section = "chunks_section"
graph = "kg_nodes"
"#;
    let config = RetrieverConfig::from_toml(toml).unwrap();
    assert_eq!(config.max_top_k, 100);
    assert_eq!(config.slo_ms, 250);
    assert_eq!(config.weights.bm25, 0.6);
    assert_eq!(config.weights.splade, 0.4);
    // Non-overridden fields keep defaults.
    assert_eq!(config.weights.dense, 0.40);
    assert_eq!(config.default_top_k, 10);
    assert!(config.multi_granularity.enabled);
    assert_eq!(
        config.multi_granularity.indexes.get("graph").map(String::as_str),
        Some("kg_nodes")
    );
}

#[test]
fn config_roundtrips_through_toml() {
    let config = RetrieverConfig::default();
    let toml_str = config.to_toml().unwrap();
    let roundtripped = RetrieverConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.rrf_k, config.rrf_k);
    assert_eq!(roundtripped.weights, config.weights);
    assert_eq!(roundtripped.neighbor_merge, config.neighbor_merge);
    assert_eq!(roundtripped.cache, config.cache);
}

#[test]
fn intent_rules_load_from_toml() {
    let toml = r#"
[[intent_rules]]
name = "dosing"
patterns = ["\\bdose\\b"]
boosts = { section = 2.0 }
filters = { section = "dosage" }

[[intent_rules]]
name = "general"
patterns = [".*"]
"#;
    let config = RetrieverConfig::from_toml(toml).unwrap();
    let rules = config.intent_rules.unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].name, "dosing");
    assert_eq!(rules[0].boosts.get("section"), Some(&2.0));
    assert_eq!(rules[0].filters.get("section"), Some(&serde_json::json!("dosage")));
    assert!(rules[1].boosts.is_empty());
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = RetrieverConfig::from_toml("max_top_k = \"lots\"").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn default_top_k_above_max_is_rejected() {
    let err = RetrieverConfig::from_toml("max_top_k = 5\ndefault_top_k = 10").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => assert_eq!(field, "default_top_k"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn negative_weight_is_rejected() {
    let err = RetrieverConfig::from_toml("[weights]\ndense = -0.5").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => assert_eq!(field, "weights.dense"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn all_zero_weights_are_valid() {
    let toml = "[weights]\nbm25 = 0.0\nsplade = 0.0\ndense = 0.0\ngraph = 0.0";
    let config = RetrieverConfig::from_toml(toml).unwrap();
    assert_eq!(config.weights, FusionWeights::zero());
}

#[test]
fn min_cosine_out_of_range_is_rejected() {
    let err = RetrieverConfig::from_toml("[neighbor_merge]\nmin_cosine = 1.5").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn granularity_enabled_without_indexes_is_rejected() {
    let err = RetrieverConfig::from_toml("[multi_granularity]\nenabled = true").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "multi_granularity.indexes")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_missing_file_is_file_not_found() {
    let err = RetrieverConfig::load(std::path::Path::new("/nonexistent/prism.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
