use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form per-result metadata.
pub type Metadata = Map<String, Value>;

/// Well-known metadata keys.
pub mod metadata_keys {
    /// Adjacency similarity to the neighbouring chunk.
    pub const COSINE: &str = "cosine";
    pub const RELATIONSHIP: &str = "relationship";
    pub const GRANULARITY: &str = "granularity";
    pub const MERGED_CHUNK_IDS: &str = "merged_chunk_ids";
    pub const EXPLAIN: &str = "explain";
}

/// The independent retrieval signals fused into one ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Bm25,
    Splade,
    Dense,
    Graph,
}

impl Signal {
    pub const ALL: [Signal; 4] = [Self::Bm25, Self::Splade, Self::Dense, Self::Graph];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bm25 => "bm25",
            Self::Splade => "splade",
            Self::Dense => "dense",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-signal scores for one result. `None` means the signal did not score it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrieverScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bm25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dense: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fused: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank: Option<f64>,
}

impl RetrieverScores {
    /// Scores with only `signal` populated.
    pub fn for_signal(signal: Signal, score: f64) -> Self {
        let mut scores = Self::default();
        scores.set_signal(signal, score);
        scores
    }

    pub fn signal(&self, signal: Signal) -> Option<f64> {
        match signal {
            Signal::Bm25 => self.bm25,
            Signal::Splade => self.splade,
            Signal::Dense => self.dense,
            Signal::Graph => self.graph,
        }
    }

    pub fn set_signal(&mut self, signal: Signal, score: f64) {
        let slot = match signal {
            Signal::Bm25 => &mut self.bm25,
            Signal::Splade => &mut self.splade,
            Signal::Dense => &mut self.dense,
            Signal::Graph => &mut self.graph,
        };
        *slot = Some(score);
    }

    /// Fold `other` into `self` field by field. A field set on only one side is
    /// kept; a field set on both keeps the larger value.
    pub fn merge(&mut self, other: &RetrieverScores) {
        merge_field(&mut self.bm25, other.bm25);
        merge_field(&mut self.splade, other.splade);
        merge_field(&mut self.dense, other.dense);
        merge_field(&mut self.graph, other.graph);
        merge_field(&mut self.fused, other.fused);
        merge_field(&mut self.rerank, other.rerank);
    }

    /// Signals that scored this result.
    pub fn contributing_signals(&self) -> Vec<Signal> {
        Signal::ALL
            .into_iter()
            .filter(|s| self.signal(*s).is_some())
            .collect()
    }
}

fn merge_field(slot: &mut Option<f64>, incoming: Option<f64>) {
    *slot = match (*slot, incoming) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
}

/// One ranked chunk in a retrieval response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: String,
    pub doc_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Display score: the fused score once fusion has run.
    pub score: f64,
    #[serde(default)]
    pub scores: RetrieverScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RetrievalResult {
    pub fn new(chunk_id: impl Into<String>, doc_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            doc_id: doc_id.into(),
            text: text.into(),
            title_path: None,
            section: None,
            score: 0.0,
            scores: RetrieverScores::default(),
            start: None,
            end: None,
            metadata: Metadata::new(),
        }
    }

    /// Builder: populate one signal score and the display score.
    pub fn with_signal(mut self, signal: Signal, score: f64) -> Self {
        self.scores.set_signal(signal, score);
        self.score = score;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Adjacency similarity, if the chunk carries one.
    pub fn cosine(&self) -> Option<f64> {
        self.metadata
            .get(metadata_keys::COSINE)
            .and_then(Value::as_f64)
    }

    pub fn relationship(&self) -> Option<&str> {
        self.metadata
            .get(metadata_keys::RELATIONSHIP)
            .and_then(Value::as_str)
    }

    pub fn granularity(&self) -> Option<&str> {
        self.metadata
            .get(metadata_keys::GRANULARITY)
            .and_then(Value::as_str)
    }

    /// Record the fused score as both `scores.fused` and the display score.
    pub fn set_fused(&mut self, score: f64) {
        self.scores.fused = Some(score);
        self.score = score;
    }
}
