//! # prism-cache
//!
//! TTL caches shared by concurrent retrieval requests.
//!
//! Three caches, each with its own TTL from [`CacheConfig`]:
//! - expansion: query text → expanded terms
//! - embedding: content hash → query embedding
//! - responses: normalized-request hash → full response

pub mod keys;
pub mod ttl;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use prism_core::config::CacheConfig;
use prism_core::RetrievalResponse;

pub use keys::{content_key, json_key};
pub use ttl::TtlCache;

/// Point-in-time counters for one cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// The caches used by one retrieval service.
pub struct RetrievalCaches {
    pub expansion: TtlCache<String, BTreeMap<String, f64>>,
    pub embedding: TtlCache<String, Vec<f32>>,
    pub responses: TtlCache<String, RetrievalResponse>,
}

impl RetrievalCaches {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            expansion: TtlCache::new(config.expansion_cache_seconds, config.max_entries),
            embedding: TtlCache::new(config.embedding_cache_seconds, config.max_entries),
            responses: TtlCache::new(config.query_cache_seconds, config.max_entries),
        }
    }

    /// Stats keyed by cache name.
    pub fn stats(&self) -> BTreeMap<&'static str, CacheStats> {
        BTreeMap::from([
            ("expansion", self.expansion.stats()),
            ("embedding", self.embedding.stats()),
            ("responses", self.responses.stats()),
        ])
    }

    pub fn clear(&self) {
        self.expansion.clear();
        self.embedding.clear();
        self.responses.clear();
    }
}

impl Default for RetrievalCaches {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
