use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::PrismResult;

/// Learned sparse encoder (SPLADE): text → weighted vocabulary terms.
#[async_trait]
pub trait ISparseEncoder: Send + Sync {
    async fn expand(&self, text: &str) -> PrismResult<HashMap<String, f32>>;
}
