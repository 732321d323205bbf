//! # prism-retrieval
//!
//! The query engine. One request fans out to up to four retrieval signals
//! concurrently, the per-signal pools are fused into one ranking, and the
//! ranking is consolidated and optionally reranked.
//!
//! ## Architecture
//!
//! ```text
//! RetrievalService (IRetriever)
//! ├── IntentClassifier (ordered regex rules → boosts + filters)
//! ├── OntologyExpander (concept catalog → weighted terms)
//! ├── Signal branches (tokio::join!)
//! │   ├── BM25    (ILexicalSearch on bm25_index)
//! │   ├── SPLADE  (ISparseEncoder → ILexicalSearch on splade_index)
//! │   ├── Dense   (IEmbedder → IVectorSearch on dense_index)
//! │   └── Graph   (ILexicalSearch over granularity indexes)
//! ├── FusionEngine
//! │   ├── Min-max normalization + weighted sum
//! │   ├── RRF fallback (degenerate weights)
//! │   └── Dedup (per-signal score merge)
//! ├── NeighborMerger (same-doc adjacency under a token budget)
//! ├── Reranker splice (top-N head)
//! └── RetrievalCaches (expansion, embedding, response)
//! ```

pub mod expansion;
pub mod fusion;
pub mod intent;
pub mod merge;
pub mod ranking;
pub mod search;
pub mod service;

pub use expansion::{Expansion, OntologyExpander};
pub use fusion::{FusionEngine, FusionMethod, FusionOutcome};
pub use intent::{IntentClassifier, IntentContext};
pub use merge::{filter_by_relationship, NeighborMerger, TokenCounter};
pub use search::SignalPool;
pub use service::{RetrievalService, RetrievalServiceBuilder, ServiceStats};
