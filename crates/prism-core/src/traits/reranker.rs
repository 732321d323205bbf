use async_trait::async_trait;

use crate::errors::PrismResult;
use crate::models::RetrievalResult;

/// Precision reranker (cross-encoder or similar).
#[async_trait]
pub trait IReranker: Send + Sync {
    /// Reorder `candidates` by relevance to `query`. Implementations may set
    /// `scores.rerank` on the returned results.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RetrievalResult>,
    ) -> PrismResult<Vec<RetrievalResult>>;
}
