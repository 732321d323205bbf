//! RetrievalService: per-request orchestration.
//!
//! normalize → response cache → intent → expansion (cached) → concurrent
//! fan-out → dedup + fusion → neighbor merge → relationship filter →
//! optional rerank → pagination.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::Instrument;
use uuid::Uuid;

use prism_cache::{json_key, CacheStats, RetrievalCaches};
use prism_core::config::RetrieverConfig;
use prism_core::errors::{PrismResult, RetrievalError};
use prism_core::models::{
    NormalizedRequest, RetrievalRequest, RetrievalResponse, RetrievalResult, RetrieverTiming,
    Signal,
};
use prism_core::traits::{
    IConceptCatalog, IEmbedder, ILexicalSearch, IReranker, IRetriever, ISparseEncoder,
    IVectorSearch,
};
use prism_observability::query_log::QueryLogEntry;
use prism_observability::tracing_setup::events;
use prism_observability::{
    retrieval_span, signal_span, DegradationEvent, DegradationTracker, QueryLog, QueryLogSummary,
};

use crate::expansion::{Expansion, OntologyExpander};
use crate::fusion::{FusionEngine, FusionMethod};
use crate::intent::IntentClassifier;
use crate::merge::{filter_by_relationship, NeighborMerger, TokenCounter};
use crate::ranking::rerank_head;
use crate::search::{branches, lexical_body, SignalPool};

const DEFAULT_QUERY_LOG_CAPACITY: usize = 10_000;

/// Response metadata keys.
pub mod response_keys {
    pub const REQUEST_ID: &str = "request_id";
    pub const CACHE_HIT: &str = "cache_hit";
    pub const FUSION_METHOD: &str = "fusion_method";
    pub const FAILED_SIGNALS: &str = "failed_signals";
    pub const CANDIDATES: &str = "candidates";
    pub const SLO_MS: &str = "slo_ms";
    pub const SLO_BREACHED: &str = "slo_breached";
    pub const RERANK_ERROR: &str = "rerank_error";
    pub const EXPANSION_FAILURES: &str = "expansion_failures";
    pub const FEATURE_FLAGS: &str = "feature_flags";
}

struct DenseClients {
    embedder: Arc<dyn IEmbedder>,
    vector: Arc<dyn IVectorSearch>,
}

struct BranchOutcome {
    signal: Signal,
    result: PrismResult<SignalPool>,
    elapsed_ms: f64,
}

/// Snapshot of service-level counters.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub caches: BTreeMap<&'static str, CacheStats>,
    pub queries: QueryLogSummary,
    pub active_degradations: Vec<String>,
}

pub struct RetrievalServiceBuilder {
    config: RetrieverConfig,
    lexical: Arc<dyn ILexicalSearch>,
    sparse: Option<Arc<dyn ISparseEncoder>>,
    dense: Option<DenseClients>,
    catalog: Option<Arc<dyn IConceptCatalog>>,
    reranker: Option<Arc<dyn IReranker>>,
    token_counter: Option<Arc<TokenCounter>>,
    query_log_capacity: usize,
}

impl RetrievalServiceBuilder {
    /// The lexical client is required: it serves BM25, the sparse index, and
    /// the granularity indexes.
    pub fn new(config: RetrieverConfig, lexical: Arc<dyn ILexicalSearch>) -> Self {
        Self {
            config,
            lexical,
            sparse: None,
            dense: None,
            catalog: None,
            reranker: None,
            token_counter: None,
            query_log_capacity: DEFAULT_QUERY_LOG_CAPACITY,
        }
    }

    pub fn with_dense(mut self, embedder: Arc<dyn IEmbedder>, vector: Arc<dyn IVectorSearch>) -> Self {
        self.dense = Some(DenseClients { embedder, vector });
        self
    }

    pub fn with_sparse(mut self, encoder: Arc<dyn ISparseEncoder>) -> Self {
        self.sparse = Some(encoder);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn IConceptCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn IReranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Share one tokenizer across services.
    pub fn with_token_counter(mut self, counter: Arc<TokenCounter>) -> Self {
        self.token_counter = Some(counter);
        self
    }

    pub fn with_query_log_capacity(mut self, capacity: usize) -> Self {
        self.query_log_capacity = capacity;
        self
    }

    pub fn build(self) -> PrismResult<RetrievalService> {
        self.config.validate()?;
        let classifier = IntentClassifier::from_config(&self.config)?;
        let merger = match self.token_counter {
            Some(counter) => NeighborMerger::with_counter(self.config.neighbor_merge.clone(), counter),
            None => NeighborMerger::new(self.config.neighbor_merge.clone())?,
        };

        let service = RetrievalService {
            fusion: FusionEngine::new(self.config.weights, self.config.rrf_k),
            caches: RetrievalCaches::from_config(&self.config.cache),
            expander: OntologyExpander::new(self.catalog),
            classifier,
            merger,
            lexical: self.lexical,
            sparse: self.sparse,
            dense: self.dense,
            reranker: self.reranker,
            query_log: Mutex::new(QueryLog::with_capacity(self.query_log_capacity)),
            degradation: Mutex::new(DegradationTracker::new()),
            config: self.config,
        };
        let signals = service.enabled_signals();
        if signals.is_empty() {
            return Err(RetrievalError::NoSignalsConfigured.into());
        }
        tracing::info!(
            signals = ?signals,
            rerank = service.reranker.is_some(),
            expansion = service.expander.is_enabled(),
            "retrieval service ready"
        );
        Ok(service)
    }
}

pub struct RetrievalService {
    config: RetrieverConfig,
    lexical: Arc<dyn ILexicalSearch>,
    sparse: Option<Arc<dyn ISparseEncoder>>,
    dense: Option<DenseClients>,
    reranker: Option<Arc<dyn IReranker>>,
    classifier: IntentClassifier,
    expander: OntologyExpander,
    fusion: FusionEngine,
    merger: NeighborMerger,
    caches: RetrievalCaches,
    query_log: Mutex<QueryLog>,
    degradation: Mutex<DegradationTracker>,
}

impl RetrievalService {
    pub fn builder(config: RetrieverConfig, lexical: Arc<dyn ILexicalSearch>) -> RetrievalServiceBuilder {
        RetrievalServiceBuilder::new(config, lexical)
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Signals that run on every request, in fan-out order.
    pub fn enabled_signals(&self) -> Vec<Signal> {
        let mut signals = Vec::with_capacity(4);
        if !self.config.bm25_index.trim().is_empty() {
            signals.push(Signal::Bm25);
        }
        if self.sparse.is_some() && !self.config.splade_index.trim().is_empty() {
            signals.push(Signal::Splade);
        }
        if self.dense.is_some() && !self.config.dense_index.trim().is_empty() {
            signals.push(Signal::Dense);
        }
        if self.config.multi_granularity.enabled && !self.config.multi_granularity.indexes.is_empty() {
            signals.push(Signal::Graph);
        }
        signals
    }

    /// Run one request end to end. Dropping the returned future cancels every
    /// pending backend call.
    pub async fn retrieve(&self, request: RetrievalRequest) -> PrismResult<RetrievalResponse> {
        let request_id = Uuid::new_v4();
        let request = request.normalize(&self.config);
        let span = retrieval_span!(request_id, request.query);
        self.run(request, request_id).instrument(span).await
    }

    pub fn stats(&self) -> ServiceStats {
        let queries = self
            .query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary();
        let active_degradations = self
            .degradation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active_components();
        ServiceStats {
            caches: self.caches.stats(),
            queries,
            active_degradations,
        }
    }

    /// Drop all cached expansions, embeddings, and responses.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }

    async fn run(&self, request: NormalizedRequest, request_id: Uuid) -> PrismResult<RetrievalResponse> {
        let started = Instant::now();

        if request.query.is_empty() {
            let intent = self.resolve_intent(&request);
            tracing::debug!("blank query, returning empty response");
            return Ok(self.empty_response(&request, intent, request_id, started));
        }

        let window_cap = self.window_cap();
        if request.from_ >= window_cap {
            let intent = self.resolve_intent(&request);
            tracing::debug!(
                from = request.from_,
                window_cap,
                "offset beyond candidate window, returning empty response"
            );
            return Ok(self.empty_response(&request, intent, request_id, started));
        }

        let cache_key = match json_key(&request) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, "could not derive response cache key");
                None
            }
        };
        if let Some(key) = &cache_key {
            if let Some(mut cached) = self.caches.responses.get(key) {
                events::cache_hit("responses");
                let latency_ms = elapsed_ms(started);
                cached.latency_ms = latency_ms;
                cached.timings = vec![RetrieverTiming::new("cache", latency_ms)];
                cached
                    .metadata
                    .insert(response_keys::CACHE_HIT.to_string(), Value::Bool(true));
                cached.metadata.insert(
                    response_keys::REQUEST_ID.to_string(),
                    Value::String(request_id.to_string()),
                );
                self.log_query(
                    QueryLogEntry::new(&request.query, &cached.intent, started.elapsed(), cached.results.len())
                        .with_cache_hit(true),
                );
                return Ok(cached);
            }
        }

        let mut timings: Vec<RetrieverTiming> = Vec::new();

        // Intent. Request filters win over rule filters.
        let stage = Instant::now();
        let intent = self.resolve_intent(&request);
        let context = self.classifier.context_for(&intent);
        let mut filters = context.filters.clone();
        filters.extend(request.filters.clone());
        timings.push(RetrieverTiming::new("intent", elapsed_ms(stage)));
        tracing::debug!(intent = %intent, filters = filters.len(), "intent resolved");

        let stage = Instant::now();
        let expansion = self.expand(&request.query).await;
        let expanded_terms = expansion.terms;
        timings.push(RetrieverTiming::new("expansion", elapsed_ms(stage)));

        let size = request
            .window()
            .min(window_cap)
            .max(self.config.rerank_top_n)
            .max(1)
            .saturating_mul(self.config.candidate_multiplier);
        let body = lexical_body(&request.query, &expanded_terms, &context.boosts, &filters);
        let outcomes = self.fan_out(&request.query, &body, &filters, size).await;

        let mut pools: Vec<SignalPool> = Vec::with_capacity(outcomes.len());
        let mut failures: Vec<String> = Vec::new();
        for outcome in outcomes {
            timings.push(RetrieverTiming::new(outcome.signal.as_str(), outcome.elapsed_ms));
            match outcome.result {
                Ok(pool) => {
                    tracing::debug!(signal = %outcome.signal, hits = pool.len(), "signal returned");
                    self.recovered(outcome.signal.as_str());
                    pools.push(pool);
                }
                Err(e) => {
                    events::signal_failed(outcome.signal.as_str(), &e.to_string());
                    self.degraded(outcome.signal.as_str(), &e.to_string(), "remaining signals");
                    failures.push(format!("{}: {e}", outcome.signal));
                }
            }
        }
        if pools.is_empty() {
            self.log_query(
                QueryLogEntry::new(&request.query, &intent, started.elapsed(), 0)
                    .with_failed_signals(failures.clone()),
            );
            return Err(RetrievalError::AllSignalsFailed { failures }.into());
        }

        let stage = Instant::now();
        let (method, fused) = self.fusion.rank(&pools, request.explain);
        timings.push(RetrieverTiming::new("fusion", elapsed_ms(stage)));

        let stage = Instant::now();
        let mut results = self.merger.merge(fused);
        if let Some(allowed) = &request.allowed_relationships {
            results = filter_by_relationship(results, allowed);
        }
        timings.push(RetrieverTiming::new("merge", elapsed_ms(stage)));

        let rerank_requested = request
            .rerank_enabled
            .unwrap_or(self.config.rerank_enabled);
        let mut rerank_error: Option<String> = None;
        if let (true, Some(reranker)) = (rerank_requested, &self.reranker) {
            let stage = Instant::now();
            let outcome = rerank_head(
                reranker.as_ref(),
                &request.query,
                results,
                self.config.rerank_top_n,
            )
            .await;
            results = outcome.results;
            match outcome.error {
                Some(error) => {
                    self.degraded("reranker", &error, "fused order");
                    rerank_error = Some(error);
                }
                None if outcome.reranked > 0 => self.recovered("reranker"),
                None => {}
            }
            timings.push(RetrieverTiming::new("rerank", elapsed_ms(stage)));
        }

        let candidates = results.len();
        let page: Vec<RetrievalResult> = results
            .into_iter()
            .skip(request.from_)
            .take(request.top_k)
            .collect();

        let latency_ms = elapsed_ms(started);
        let slo_breached = latency_ms > self.config.slo_ms as f64;
        if slo_breached {
            events::slo_exceeded(latency_ms, self.config.slo_ms);
        }

        let mut metadata = self.base_metadata(&request, request_id, method);
        metadata.insert(response_keys::FAILED_SIGNALS.to_string(), json!(failures));
        metadata.insert(response_keys::CANDIDATES.to_string(), json!(candidates));
        metadata.insert(response_keys::SLO_BREACHED.to_string(), json!(slo_breached));
        if let Some(error) = &rerank_error {
            metadata.insert(response_keys::RERANK_ERROR.to_string(), json!(error));
        }
        if !expansion.failed_lookups.is_empty() {
            metadata.insert(
                response_keys::EXPANSION_FAILURES.to_string(),
                json!(expansion.failed_lookups),
            );
        }

        let response = RetrievalResponse {
            results: page,
            timings,
            expanded_terms,
            intent,
            latency_ms,
            from_: request.from_,
            size: request.top_k,
            metadata,
        };

        events::retrieval_completed(&response.intent, response.results.len(), latency_ms, method.as_str());
        self.log_query(
            QueryLogEntry::new(&request.query, &response.intent, started.elapsed(), response.results.len())
                .with_slo_breached(slo_breached)
                .with_failed_signals(failures.clone()),
        );

        // Degraded responses are not cached.
        let complete =
            failures.is_empty() && rerank_error.is_none() && expansion.failed_lookups.is_empty();
        if let (Some(key), true) = (cache_key, complete) {
            self.caches.responses.insert(key, response.clone());
        }
        Ok(response)
    }

    fn resolve_intent(&self, request: &NormalizedRequest) -> String {
        match &request.intent {
            Some(intent) => intent.clone(),
            None => self.classifier.detect(&request.query).to_string(),
        }
    }

    /// Cached expansion for `query`. Partial expansions are returned but not
    /// cached, so the next request retries the failed lookups.
    async fn expand(&self, query: &str) -> Expansion {
        if let Some(terms) = self.caches.expansion.get(query) {
            events::cache_hit("expansion");
            return Expansion {
                terms,
                failed_lookups: Vec::new(),
            };
        }
        let expansion = self.expander.expand(query).await;
        if expansion.is_complete() {
            if self.expander.is_enabled() {
                self.recovered("expansion");
            }
            self.caches
                .expansion
                .insert(query.to_string(), expansion.terms.clone());
        } else {
            let failed = expansion.failed_lookups.join(", ");
            self.degraded("expansion", &format!("lookup failed for {failed}"), "partial terms");
        }
        expansion
    }

    /// Deepest page end served from the candidate pool. Offsets at or past it
    /// get an empty page without touching a backend.
    fn window_cap(&self) -> usize {
        self.config
            .max_top_k
            .max(self.config.rerank_top_n)
            .max(1)
            .saturating_mul(self.config.candidate_multiplier)
    }

    /// Run every enabled branch concurrently. Outcomes come back in signal order.
    async fn fan_out(
        &self,
        query: &str,
        body: &Value,
        filters: &BTreeMap<String, Value>,
        size: usize,
    ) -> Vec<BranchOutcome> {
        let enabled = self.enabled_signals();
        let lexical = self.lexical.as_ref();

        let bm25 = async {
            if !enabled.contains(&Signal::Bm25) {
                return None;
            }
            let branch = branches::bm25(lexical, &self.config.bm25_index, body, size);
            Some(timed(Signal::Bm25, branch).await)
        };
        let splade = async {
            let encoder = self.sparse.as_ref().filter(|_| enabled.contains(&Signal::Splade))?;
            let branch = branches::splade(
                encoder.as_ref(),
                lexical,
                &self.config.splade_index,
                query,
                filters,
                size,
            );
            Some(timed(Signal::Splade, branch).await)
        };
        let dense = async {
            let clients = self.dense.as_ref().filter(|_| enabled.contains(&Signal::Dense))?;
            let branch = branches::dense(
                clients.embedder.as_ref(),
                clients.vector.as_ref(),
                &self.caches.embedding,
                &self.config.dense_index,
                query,
                size,
            );
            Some(timed(Signal::Dense, branch).await)
        };
        let graph = async {
            if !enabled.contains(&Signal::Graph) {
                return None;
            }
            let branch = branches::graph(
                Arc::clone(&self.lexical),
                &self.config.multi_granularity.indexes,
                body,
                size,
            );
            Some(timed(Signal::Graph, branch).await)
        };

        let (bm25, splade, dense, graph) = tokio::join!(bm25, splade, dense, graph);
        [bm25, splade, dense, graph].into_iter().flatten().collect()
    }

    fn base_metadata(
        &self,
        request: &NormalizedRequest,
        request_id: Uuid,
        method: FusionMethod,
    ) -> serde_json::Map<String, Value> {
        let rerank = request
            .rerank_enabled
            .unwrap_or(self.config.rerank_enabled)
            && self.reranker.is_some();
        let signals: Vec<&str> = self.enabled_signals().iter().map(Signal::as_str).collect();

        let mut metadata = serde_json::Map::new();
        metadata.insert(response_keys::REQUEST_ID.to_string(), json!(request_id.to_string()));
        metadata.insert(response_keys::CACHE_HIT.to_string(), json!(false));
        metadata.insert(response_keys::FUSION_METHOD.to_string(), json!(method.as_str()));
        metadata.insert(response_keys::SLO_MS.to_string(), json!(self.config.slo_ms));
        metadata.insert(
            response_keys::FEATURE_FLAGS.to_string(),
            json!({
                "rerank": rerank,
                "expansion": self.expander.is_enabled(),
                "multi_granularity": self.config.multi_granularity.enabled,
                "explain": request.explain,
                "signals": signals,
            }),
        );
        metadata
    }

    fn empty_response(
        &self,
        request: &NormalizedRequest,
        intent: String,
        request_id: Uuid,
        started: Instant,
    ) -> RetrievalResponse {
        let mut metadata = self.base_metadata(request, request_id, FusionMethod::Empty);
        metadata.insert(response_keys::FAILED_SIGNALS.to_string(), json!([]));
        metadata.insert(response_keys::CANDIDATES.to_string(), json!(0));
        metadata.insert(response_keys::SLO_BREACHED.to_string(), json!(false));
        RetrievalResponse {
            results: Vec::new(),
            timings: Vec::new(),
            expanded_terms: BTreeMap::new(),
            intent,
            latency_ms: elapsed_ms(started),
            from_: request.from_,
            size: request.top_k,
            metadata,
        }
    }

    fn log_query(&self, entry: QueryLogEntry) {
        self.query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(entry);
    }

    fn degraded(&self, component: &str, failure: &str, fallback: &str) {
        self.degradation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(DegradationEvent::new(component, failure, fallback));
    }

    fn recovered(&self, component: &str) {
        self.degradation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mark_recovered(component);
    }
}

#[async_trait]
impl IRetriever for RetrievalService {
    async fn retrieve(&self, request: RetrievalRequest) -> PrismResult<RetrievalResponse> {
        RetrievalService::retrieve(self, request).await
    }
}

async fn timed<F>(signal: Signal, branch: F) -> BranchOutcome
where
    F: Future<Output = PrismResult<SignalPool>>,
{
    let started = Instant::now();
    let result = branch.instrument(signal_span!(signal)).await;
    BranchOutcome {
        signal,
        result,
        elapsed_ms: elapsed_ms(started),
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1_000.0
}
