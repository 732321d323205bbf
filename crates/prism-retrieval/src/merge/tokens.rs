use std::sync::Arc;

use moka::sync::Cache;
use tiktoken_rs::CoreBPE;

use prism_core::errors::{PrismResult, RetrievalError};

/// Token counter over tiktoken's `cl100k_base`, caching counts by blake3
/// content hash.
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
    cache: Cache<String, usize>,
}

impl TokenCounter {
    pub fn new(cache_capacity: u64) -> PrismResult<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| RetrievalError::TokenizerUnavailable {
            reason: e.to_string(),
        })?;
        Ok(Self {
            bpe: Arc::new(bpe),
            cache: Cache::new(cache_capacity),
        })
    }

    /// Uncached count.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    pub fn count_cached(&self, text: &str) -> usize {
        let hash = blake3::hash(text.as_bytes()).to_hex().to_string();
        self.cache.get_with(hash, || self.count(text))
    }
}
