//! Post-fusion ranking stages.

pub mod reranker;

pub use reranker::{rerank_head, RerankOutcome};
