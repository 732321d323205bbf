use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{defaults, CacheConfig, FusionWeights, MultiGranularityConfig, NeighborMergeConfig};
use crate::errors::ConfigError;
use crate::models::IntentRule;

/// Top-level retriever configuration.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`PRISM_*`)
/// 2. TOML file passed to [`RetrieverConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub bm25_index: String,
    pub splade_index: String,
    pub dense_index: String,
    pub max_top_k: usize,
    pub default_top_k: usize,
    /// RRF smoothing constant.
    pub rrf_k: u32,
    /// Head of the fused list handed to the reranker.
    pub rerank_top_n: usize,
    /// Service default; requests may override it.
    pub rerank_enabled: bool,
    /// Backends are asked for `max(from + top_k, rerank_top_n) * candidate_multiplier` hits.
    pub candidate_multiplier: usize,
    pub slo_ms: u64,
    pub weights: FusionWeights,
    pub neighbor_merge: NeighborMergeConfig,
    pub cache: CacheConfig,
    pub multi_granularity: MultiGranularityConfig,
    /// Replaces the built-in intent rules when set. The last rule must be a catch-all.
    pub intent_rules: Option<Vec<IntentRule>>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            bm25_index: defaults::DEFAULT_BM25_INDEX.to_string(),
            splade_index: defaults::DEFAULT_SPLADE_INDEX.to_string(),
            dense_index: defaults::DEFAULT_DENSE_INDEX.to_string(),
            max_top_k: defaults::DEFAULT_MAX_TOP_K,
            default_top_k: defaults::DEFAULT_TOP_K,
            rrf_k: defaults::DEFAULT_RRF_K,
            rerank_top_n: defaults::DEFAULT_RERANK_TOP_N,
            rerank_enabled: defaults::DEFAULT_RERANK_ENABLED,
            candidate_multiplier: defaults::DEFAULT_CANDIDATE_MULTIPLIER,
            slo_ms: defaults::DEFAULT_SLO_MS,
            weights: FusionWeights::default(),
            neighbor_merge: NeighborMergeConfig::default(),
            cache: CacheConfig::default(),
            multi_granularity: MultiGranularityConfig::default(),
            intent_rules: None,
        }
    }
}

impl RetrieverConfig {
    /// Load a config file, apply `PRISM_*` environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_top_k == 0 {
            return Err(invalid("max_top_k", "must be greater than 0"));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(invalid("default_top_k", "must be between 1 and max_top_k"));
        }
        if self.rrf_k == 0 {
            return Err(invalid("rrf_k", "must be greater than 0"));
        }
        if self.candidate_multiplier == 0 {
            return Err(invalid("candidate_multiplier", "must be greater than 0"));
        }
        for (field, weight) in [
            ("weights.bm25", self.weights.bm25),
            ("weights.splade", self.weights.splade),
            ("weights.dense", self.weights.dense),
            ("weights.graph", self.weights.graph),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(field, "must be a finite, non-negative number"));
            }
        }
        let min_cosine = self.neighbor_merge.min_cosine;
        if !(0.0..=1.0).contains(&min_cosine) {
            return Err(invalid(
                "neighbor_merge.min_cosine",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.multi_granularity.enabled && self.multi_granularity.indexes.is_empty() {
            return Err(invalid(
                "multi_granularity.indexes",
                "must name at least one index when multi_granularity is enabled",
            ));
        }
        if let Some(rules) = &self.intent_rules {
            if rules.is_empty() {
                return Err(invalid("intent_rules", "must contain at least one rule"));
            }
        }
        Ok(())
    }

    /// Apply `PRISM_*` environment variable overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<u64>("PRISM_SLO_MS") {
            self.slo_ms = v;
        }
        if let Some(v) = env_parse::<usize>("PRISM_DEFAULT_TOP_K") {
            self.default_top_k = v;
        }
        if let Some(v) = env_parse::<usize>("PRISM_MAX_TOP_K") {
            self.max_top_k = v;
        }
        if let Some(v) = env_parse::<u32>("PRISM_RRF_K") {
            self.rrf_k = v;
        }
        if let Some(v) = env_parse::<usize>("PRISM_RERANK_TOP_N") {
            self.rerank_top_n = v;
        }
        if let Some(v) = env_parse::<bool>("PRISM_RERANK_ENABLED") {
            self.rerank_enabled = v;
        }
        if let Some(v) = env_parse::<bool>("PRISM_MULTI_GRANULARITY") {
            self.multi_granularity.enabled = v;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
