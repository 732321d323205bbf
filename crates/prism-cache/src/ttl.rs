//! Concurrent TTL cache.
//!
//! Entries carry their own deadline. Expiry is checked when an entry is read,
//! and a full cache purges expired entries before it admits a new key. Nothing
//! sweeps the map in the background. Concurrent misses on the same key may both
//! recompute, and the last insert wins.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::CacheStats;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A `DashMap`-backed cache whose entries expire `ttl` after insertion.
///
/// A zero TTL disables the cache: inserts are dropped and every read misses.
pub struct TtlCache<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Cache with a TTL in whole seconds.
    pub fn new(ttl_seconds: u64, max_entries: usize) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds), max_entries)
    }

    pub fn with_ttl(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Whether the cache stores anything at all.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry. An expired entry counts as a miss and is removed.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        // The read guard must be released before `remove_if` takes the shard lock.
        let live = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => None,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match live {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                tracing::trace!("evicted expired cache entry on read");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value. Returns `false` only when the cache is disabled.
    ///
    /// A new key arriving at a full cache first drops every expired entry; if
    /// the cache is still full, the entry closest to expiry is evicted.
    pub fn insert(&self, key: K, value: V) -> bool
    where
        K: Clone,
    {
        if !self.is_enabled() {
            return false;
        }
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.make_room();
        }
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(key, Entry { value, expires_at });
        true
    }

    fn make_room(&self)
    where
        K: Clone,
    {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let expired = before.saturating_sub(self.entries.len());
        if self.entries.len() < self.max_entries {
            tracing::debug!(expired, "pruned expired cache entries");
            return;
        }

        // Every entry shares one TTL, so the earliest deadline is the oldest insert.
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(oldest) = oldest {
            self.entries.remove(&oldest);
            tracing::debug!(
                max_entries = self.max_entries,
                "cache at capacity, evicted oldest entry"
            );
        }
    }

    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key);
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of reads that hit, 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits(),
            misses: self.misses(),
            hit_rate: self.hit_rate(),
        }
    }
}
