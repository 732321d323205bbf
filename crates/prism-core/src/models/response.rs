use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Metadata, RetrievalResult};

/// Duration of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverTiming {
    pub component: String,
    pub duration_ms: f64,
}

impl RetrieverTiming {
    pub fn new(component: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            component: component.into(),
            duration_ms,
        }
    }
}

/// Response of one retrieval request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub results: Vec<RetrievalResult>,
    pub timings: Vec<RetrieverTiming>,
    pub expanded_terms: BTreeMap<String, f64>,
    pub intent: String,
    pub latency_ms: f64,
    #[serde(rename = "from")]
    pub from_: usize,
    pub size: usize,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RetrievalResponse {
    /// Duration recorded for a stage, if it ran.
    pub fn timing(&self, component: &str) -> Option<f64> {
        self.timings
            .iter()
            .find(|t| t.component == component)
            .map(|t| t.duration_ms)
    }
}

/// Query metadata block of the HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMeta {
    pub intent_detected: String,
    pub expanded_terms: BTreeMap<String, f64>,
    pub feature_flags: Value,
    pub latency_ms: f64,
    pub timings: Vec<RetrieverTiming>,
    pub from: usize,
    pub size: usize,
}

/// JSON shape served by the transport binding: `{ results, query_meta }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub results: Vec<RetrievalResult>,
    pub query_meta: QueryMeta,
}

impl From<RetrievalResponse> for ApiResponse {
    fn from(response: RetrievalResponse) -> Self {
        let feature_flags = response
            .metadata
            .get("feature_flags")
            .cloned()
            .unwrap_or_else(|| Value::Object(Metadata::new()));
        Self {
            results: response.results,
            query_meta: QueryMeta {
                intent_detected: response.intent,
                expanded_terms: response.expanded_terms,
                feature_flags,
                latency_ms: response.latency_ms,
                timings: response.timings,
                from: response.from_,
                size: response.size,
            },
        }
    }
}
