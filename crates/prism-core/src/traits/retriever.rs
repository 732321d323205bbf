use async_trait::async_trait;

use crate::errors::PrismResult;
use crate::models::{RetrievalRequest, RetrievalResponse};

/// End-to-end retrieval: request in, ranked response out.
#[async_trait]
pub trait IRetriever: Send + Sync {
    async fn retrieve(&self, request: RetrievalRequest) -> PrismResult<RetrievalResponse>;
}
