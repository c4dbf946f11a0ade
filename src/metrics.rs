//! Cache metrics.
//!
//! Plain counters updated inline by the cache operations, reported as
//! a `BTreeMap` so the key order is deterministic — metric dumps stay
//! comparable across runs and stable in logs.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Common reporting interface for metric holders.
pub trait CacheMetrics {
    /// All metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Name of the eviction discipline these metrics describe.
    fn algorithm_name(&self) -> &'static str;
}

/// Counters tracked by a [`TtlCache`](crate::TtlCache).
///
/// Removals are split by driver: `lru_evictions` counts entries pushed
/// out to make room, `ttl_expirations` counts entries whose TTL
/// elapsed (removed lazily or by a sweep).
#[derive(Debug, Default, Clone)]
pub struct TtlCacheMetrics {
    /// Total `get` calls.
    pub requests: u64,
    /// `get` calls that found a live entry.
    pub cache_hits: u64,
    /// New keys written.
    pub insertions: u64,
    /// Existing keys overwritten.
    pub updates: u64,
    /// Entries removed to make room for a new insertion.
    pub lru_evictions: u64,
    /// Entries removed because their TTL elapsed.
    pub ttl_expirations: u64,
    /// Sampling rounds performed by `remove_expired`.
    pub sweep_rounds: u64,
    /// Slot indices drawn into sweep samples, cumulative.
    pub sampled_slots: u64,
}

impl TtlCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.requests += 1;
        // misses are derivable as requests - cache_hits
    }

    #[inline]
    pub(crate) fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    #[inline]
    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.lru_evictions += 1;
    }

    #[inline]
    pub(crate) fn record_expiration(&mut self) {
        self.ttl_expirations += 1;
    }

    #[inline]
    pub(crate) fn record_sweep_round(&mut self, sampled: u64) {
        self.sweep_rounds += 1;
        self.sampled_slots += sampled;
    }

    /// Fraction of requests that hit, or 0.0 before any request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that missed, or 0.0 before any request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a `BTreeMap` for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("lru_evictions".to_string(), self.lru_evictions as f64);
        metrics.insert("miss_rate".to_string(), self.miss_rate());
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("sampled_slots".to_string(), self.sampled_slots as f64);
        metrics.insert("sweep_rounds".to_string(), self.sweep_rounds as f64);
        metrics.insert("ttl_expirations".to_string(), self.ttl_expirations as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics
    }
}

impl CacheMetrics for TtlCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU+TTL"
    }
}
