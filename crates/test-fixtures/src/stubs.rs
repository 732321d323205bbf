//! In-memory backends that record how they were called.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use prism_core::errors::{BackendError, PrismResult};
use prism_core::models::{OntologyTerm, RetrievalResult, SearchHit};
use prism_core::traits::{
    IConceptCatalog, IEmbedder, ILexicalSearch, IReranker, ISparseEncoder, IVectorSearch,
};

fn unavailable(backend: &str, reason: &str) -> prism_core::PrismError {
    BackendError::Unavailable {
        backend: backend.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// One recorded lexical call.
#[derive(Debug, Clone)]
pub struct LexicalCall {
    pub index: String,
    pub body: Value,
    pub size: usize,
}

/// Lexical search over fixed per-index hit lists.
#[derive(Default)]
pub struct StubLexical {
    hits: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<LexicalCall>>,
}

impl StubLexical {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.insert(index.into(), hits);
        self
    }

    /// Searches against `index` fail.
    pub fn failing_index(mut self, index: impl Into<String>) -> Self {
        self.failing.insert(index.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<LexicalCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, index: &str) -> usize {
        self.calls().iter().filter(|c| c.index == index).count()
    }
}

#[async_trait]
impl ILexicalSearch for StubLexical {
    async fn search(&self, index: &str, body: &Value, size: usize) -> PrismResult<Vec<SearchHit>> {
        self.calls.lock().unwrap().push(LexicalCall {
            index: index.to_string(),
            body: body.clone(),
            size,
        });
        pause(self.delay).await;
        if self.failing.contains(index) {
            return Err(unavailable("lexical", &format!("index {index} is down")));
        }
        let mut hits = self.hits.get(index).cloned().unwrap_or_default();
        hits.truncate(size);
        Ok(hits)
    }
}

/// Vector search returning a fixed hit list.
#[derive(Default)]
pub struct StubVectorSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    calls: AtomicUsize,
    last_embedding: Mutex<Option<Vec<f32>>>,
}

impl StubVectorSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_embedding(&self) -> Option<Vec<f32>> {
        self.last_embedding.lock().unwrap().clone()
    }
}

#[async_trait]
impl IVectorSearch for StubVectorSearch {
    async fn query(&self, _index: &str, embedding: &[f32], top_k: usize) -> PrismResult<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_embedding.lock().unwrap() = Some(embedding.to_vec());
        if self.fail {
            return Err(unavailable("vector", "connection refused"));
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

/// Embedder returning a fixed vector and recording every text.
#[derive(Default)]
pub struct StubEmbedder {
    embedding: Vec<f32>,
    fail: bool,
    texts: Mutex<Vec<String>>,
}

impl StubEmbedder {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl IEmbedder for StubEmbedder {
    async fn embed(&self, text: &str) -> PrismResult<Vec<f32>> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(unavailable("embedder", "model not loaded"));
        }
        Ok(self.embedding.clone())
    }
}

/// Sparse encoder returning fixed term weights.
#[derive(Default)]
pub struct StubSparseEncoder {
    terms: HashMap<String, f32>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubSparseEncoder {
    pub fn new(terms: HashMap<String, f32>) -> Self {
        Self {
            terms,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ISparseEncoder for StubSparseEncoder {
    async fn expand(&self, _text: &str) -> PrismResult<HashMap<String, f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(unavailable("sparse", "encoder unavailable"));
        }
        Ok(self.terms.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankMode {
    /// Reverse the candidates, scoring them by new position.
    Reverse,
    /// Always fail.
    Fail,
}

/// Reranker that reverses its input or fails.
pub struct StubReranker {
    mode: RerankMode,
    received: Mutex<Vec<usize>>,
}

impl StubReranker {
    pub fn new(mode: RerankMode) -> Self {
        Self {
            mode,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Candidate counts per call.
    pub fn received(&self) -> Vec<usize> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl IReranker for StubReranker {
    async fn rerank(
        &self,
        _query: &str,
        candidates: Vec<RetrievalResult>,
    ) -> PrismResult<Vec<RetrievalResult>> {
        self.received.lock().unwrap().push(candidates.len());
        match self.mode {
            RerankMode::Fail => Err(unavailable("reranker", "cross-encoder timeout")),
            RerankMode::Reverse => {
                let n = candidates.len();
                Ok(candidates
                    .into_iter()
                    .rev()
                    .enumerate()
                    .map(|(i, mut c)| {
                        c.scores.rerank = Some((n - i) as f64);
                        c
                    })
                    .collect())
            }
        }
    }
}

/// Concept catalog backed by fixed maps.
#[derive(Default)]
pub struct StubCatalog {
    synonyms: HashMap<String, Vec<OntologyTerm>>,
    search: HashMap<String, Vec<OntologyTerm>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synonyms(mut self, id: impl Into<String>, terms: Vec<OntologyTerm>) -> Self {
        self.synonyms.insert(id.into(), terms);
        self
    }

    pub fn with_search(mut self, text: impl Into<String>, terms: Vec<OntologyTerm>) -> Self {
        self.search.insert(text.into(), terms);
        self
    }

    /// Lookups of `key` (identifier or token) fail.
    pub fn failing_on(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IConceptCatalog for StubCatalog {
    async fn synonyms(&self, id: &str) -> PrismResult<Vec<OntologyTerm>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(id) {
            return Err(unavailable("catalog", "lookup failed"));
        }
        Ok(self.synonyms.get(id).cloned().unwrap_or_default())
    }

    async fn search(&self, text: &str) -> PrismResult<Vec<OntologyTerm>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(text) {
            return Err(unavailable("catalog", "search failed"));
        }
        Ok(self.search.get(text).cloned().unwrap_or_default())
    }
}
