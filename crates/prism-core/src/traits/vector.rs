use async_trait::async_trait;

use crate::errors::PrismResult;
use crate::models::SearchHit;

/// Text embedding provider.
#[async_trait]
pub trait IEmbedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> PrismResult<Vec<f32>>;
}

/// Dense nearest-neighbour search.
#[async_trait]
pub trait IVectorSearch: Send + Sync {
    /// Top `top_k` hits for `embedding` in `index`, sorted by descending similarity.
    async fn query(&self, index: &str, embedding: &[f32], top_k: usize) -> PrismResult<Vec<SearchHit>>;
}
