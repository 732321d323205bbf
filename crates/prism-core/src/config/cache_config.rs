use serde::{Deserialize, Serialize};

use super::defaults;

/// TTLs for the per-request caches. A TTL of 0 disables that cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub query_cache_seconds: u64,
    pub embedding_cache_seconds: u64,
    pub expansion_cache_seconds: u64,
    /// Upper bound on live entries per cache.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_cache_seconds: defaults::DEFAULT_QUERY_CACHE_SECONDS,
            embedding_cache_seconds: defaults::DEFAULT_EMBEDDING_CACHE_SECONDS,
            expansion_cache_seconds: defaults::DEFAULT_EXPANSION_CACHE_SECONDS,
            max_entries: defaults::DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}
