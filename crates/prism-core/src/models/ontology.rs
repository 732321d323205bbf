use serde::{Deserialize, Serialize};

/// A weighted term returned by the concept catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub term: String,
    pub weight: f64,
}

impl OntologyTerm {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}
