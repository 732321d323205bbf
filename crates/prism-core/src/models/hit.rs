use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw hit as returned by a search backend, before mapping into a
/// [`RetrievalResult`](super::RetrievalResult).
///
/// `source` carries the stored document fields: `chunk_id`, `doc_id`, `text`,
/// `title_path`, `section`, `start`, `end`, `metadata`, and optional
/// `cosine` / `relationship` tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub source: Map<String, Value>,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
            source: Map::new(),
        }
    }

    pub fn with_source(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.source.insert(key.into(), value.into());
        self
    }

    /// String field from `source`.
    pub fn source_str(&self, key: &str) -> Option<&str> {
        self.source.get(key).and_then(Value::as_str)
    }
}
