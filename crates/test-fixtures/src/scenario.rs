//! End-to-end retrieval scenarios stored as JSON under `retrieval/`.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

use prism_core::models::{OntologyTerm, RetrievalRequest, SearchHit};

use crate::stubs::{StubCatalog, StubEmbedder, StubLexical, StubSparseEncoder, StubVectorSearch};

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalScenario {
    pub description: String,
    pub query: String,
    #[serde(default)]
    pub top_k: Option<i64>,
    /// Index name → hits served by the lexical stub.
    pub lexical: BTreeMap<String, Vec<SearchHit>>,
    #[serde(default)]
    pub dense: Vec<SearchHit>,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub sparse_terms: HashMap<String, f32>,
    /// Granularity label → index, for graph-signal configs.
    #[serde(default)]
    pub granularity_indexes: BTreeMap<String, String>,
    #[serde(default)]
    pub catalog_search: HashMap<String, Vec<OntologyTerm>>,
    #[serde(default)]
    pub expected: Value,
}

impl RetrievalScenario {
    pub fn request(&self) -> RetrievalRequest {
        let request = RetrievalRequest::new(self.query.clone());
        match self.top_k {
            Some(k) => request.with_top_k(k),
            None => request,
        }
    }

    pub fn lexical_stub(&self) -> StubLexical {
        self.lexical
            .iter()
            .fold(StubLexical::new(), |stub, (index, hits)| {
                stub.with_index(index.clone(), hits.clone())
            })
    }

    pub fn vector_stub(&self) -> StubVectorSearch {
        StubVectorSearch::new(self.dense.clone())
    }

    pub fn embedder_stub(&self) -> StubEmbedder {
        StubEmbedder::new(self.embedding.clone())
    }

    pub fn sparse_stub(&self) -> StubSparseEncoder {
        StubSparseEncoder::new(self.sparse_terms.clone())
    }

    pub fn catalog_stub(&self) -> StubCatalog {
        self.catalog_search
            .iter()
            .fold(StubCatalog::new(), |stub, (text, terms)| {
                stub.with_search(text.clone(), terms.clone())
            })
    }

    /// String at `expected.<key>`.
    pub fn expected_str(&self, key: &str) -> Option<&str> {
        self.expected.get(key).and_then(Value::as_str)
    }
}
