use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RetrieverConfig;

/// A retrieval request as received from a caller.
///
/// Accepts both `topK` and `top_k`, and both `from` and `from_`. Out-of-range
/// pagination values are clamped by [`RetrievalRequest::normalize`], never rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    pub query: String,
    #[serde(default, alias = "topK")]
    pub top_k: Option<i64>,
    #[serde(default, rename = "from", alias = "from_")]
    pub from_: Option<i64>,
    /// `null` values are dropped during normalization.
    #[serde(default)]
    pub filters: BTreeMap<String, Option<Value>>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub rerank_enabled: Option<bool>,
    #[serde(default)]
    pub explain: bool,
    /// When set, results tagged with a relationship outside this list are dropped.
    #[serde(default)]
    pub allowed_relationships: Option<Vec<String>>,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_from(mut self, from: i64) -> Self {
        self.from_ = Some(from);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), Some(value.into()));
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_rerank(mut self, enabled: bool) -> Self {
        self.rerank_enabled = Some(enabled);
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn with_allowed_relationships<I, S>(mut self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_relationships = Some(relationships.into_iter().map(Into::into).collect());
        self
    }

    /// Fill defaults and clamp pagination to the configured bounds.
    ///
    /// - `top_k`: default `config.default_top_k`, clamped to `[1, max_top_k]`
    /// - `from_`: default 0, negatives clamp to 0
    /// - `filters`: `None` / `null` values dropped
    /// - `intent`: blank overrides are ignored
    pub fn normalize(&self, config: &RetrieverConfig) -> NormalizedRequest {
        let max_top_k = config.max_top_k.max(1);
        let top_k = match self.top_k {
            Some(k) => k.clamp(1, max_top_k as i64) as usize,
            None => config.default_top_k.clamp(1, max_top_k),
        };
        let from_ = usize::try_from(self.from_.unwrap_or(0).max(0)).unwrap_or(usize::MAX);

        let filters = self
            .filters
            .iter()
            .filter_map(|(k, v)| match v {
                Some(Value::Null) | None => None,
                Some(value) => Some((k.clone(), value.clone())),
            })
            .collect();

        let intent = self
            .intent
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        NormalizedRequest {
            query: self.query.trim().to_string(),
            top_k,
            from_,
            filters,
            intent,
            rerank_enabled: self.rerank_enabled,
            explain: self.explain,
            allowed_relationships: self.allowed_relationships.clone(),
        }
    }
}

/// A request after defaults and clamping. Serializes deterministically, so it
/// doubles as the response-cache key material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRequest {
    pub query: String,
    pub top_k: usize,
    pub from_: usize,
    pub filters: BTreeMap<String, Value>,
    pub intent: Option<String>,
    pub rerank_enabled: Option<bool>,
    pub explain: bool,
    pub allowed_relationships: Option<Vec<String>>,
}

impl NormalizedRequest {
    /// Number of candidates needed to fill the requested page. Saturates for
    /// offsets near `usize::MAX`.
    pub fn window(&self) -> usize {
        self.from_.saturating_add(self.top_k)
    }
}
