//! Wall-clock shell around [`TtlCache`].
//!
//! Generates tick timestamps from a monotonic clock so callers do not
//! supply their own. TTLs are expressed in the shell's tick unit,
//! milliseconds by default; pick another resolution through the
//! `TICKS_PER_SEC` const parameter (e.g. `1_000_000` for
//! microseconds). Because the clock is monotonic, timestamp-regression
//! errors cannot occur through this wrapper.

use crate::cache::TtlCache;
use crate::config::TtlCacheConfig;
use crate::error::Result;
use crate::metrics::TtlCacheMetrics;
use crate::Timestamp;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::DefaultHashBuilder;
use std::time::Instant;

/// A [`TtlCache`] that stamps every operation from a monotonic clock.
///
/// # Example
///
/// ```
/// use ttl_cache_rs::RealTimeCache;
///
/// let mut cache: RealTimeCache<&str, i32> = RealTimeCache::new(100, 0.5).unwrap();
///
/// // TTL in milliseconds (the default tick unit).
/// cache.insert("session", 42, 30_000).unwrap();
/// assert_eq!(cache.get(&"session").unwrap(), Some(42));
/// ```
pub struct RealTimeCache<K, V, S = DefaultHashBuilder, const TICKS_PER_SEC: i64 = 1000> {
    cache: TtlCache<K, V, S>,
    epoch: Instant,
}

impl<K: Hash + Eq, V: Clone> RealTimeCache<K, V> {
    /// Creates a millisecond-tick cache with the default hash builder.
    ///
    /// Construction bounds are those of [`TtlCache::new`].
    pub fn new(max_entries: usize, max_load_factor: f64) -> Result<Self> {
        Ok(RealTimeCache {
            cache: TtlCache::new(max_entries, max_load_factor)?,
            epoch: Instant::now(),
        })
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher, const TICKS_PER_SEC: i64>
    RealTimeCache<K, V, S, TICKS_PER_SEC>
{
    /// Creates a cache with a caller-supplied hash builder.
    pub fn with_hasher(config: TtlCacheConfig, hash_builder: S) -> Result<Self> {
        Ok(RealTimeCache {
            cache: TtlCache::with_hasher(config, hash_builder)?,
            epoch: Instant::now(),
        })
    }

    /// Looks up a key at the current clock reading.
    pub fn get<Q>(&mut self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let now = self.now_ticks();
        self.cache.get(key, now)
    }

    /// Inserts a key that lives for `ticks_to_live` ticks from now.
    ///
    /// Fails with [`CacheError::NonPositiveTtl`](crate::CacheError) for
    /// `ticks_to_live <= 0`.
    pub fn insert(&mut self, key: K, value: V, ticks_to_live: i64) -> Result<()> {
        let now = self.now_ticks();
        self.cache.insert(key, value, now, ticks_to_live)
    }

    /// Runs a sampled expiration sweep at the current clock reading.
    pub fn remove_expired(&mut self, target_ratio: f64) -> Result<()> {
        let now = self.now_ticks();
        self.cache.remove_expired(now, target_ratio)
    }

    /// Live entries, counting expired-but-unswept ones.
    #[inline]
    pub fn size(&self) -> usize {
        self.cache.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.cache.load_factor()
    }

    #[inline]
    pub fn metrics(&self) -> &TtlCacheMetrics {
        self.cache.metrics()
    }

    /// Ticks elapsed since this cache was constructed.
    pub fn now_ticks(&self) -> Timestamp {
        let elapsed = self.epoch.elapsed();
        elapsed.as_secs() as i64 * TICKS_PER_SEC
            + elapsed.subsec_nanos() as i64 * TICKS_PER_SEC / 1_000_000_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_insert_and_get() {
        let mut cache: RealTimeCache<&str, i32> = RealTimeCache::new(10, 0.5).unwrap();
        cache.insert("k", 1, 60_000).unwrap();
        assert_eq!(cache.get(&"k").unwrap(), Some(1));
        assert_eq!(cache.get(&"missing").unwrap(), None);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_short_ttl_expires() {
        let mut cache: RealTimeCache<&str, i32> = RealTimeCache::new(10, 0.5).unwrap();
        cache.insert("k", 1, 20).unwrap();
        assert_eq!(cache.get(&"k").unwrap(), Some(1));

        sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&"k").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ticks_are_monotonic() {
        let cache: RealTimeCache<&str, i32> = RealTimeCache::new(10, 0.5).unwrap();
        let a = cache.now_ticks();
        let b = cache.now_ticks();
        assert!(a >= 0);
        assert!(b >= a);
    }

    #[test]
    fn test_microsecond_resolution() {
        let mut cache: RealTimeCache<&str, i32, DefaultHashBuilder, 1_000_000> =
            RealTimeCache::with_hasher(
                TtlCacheConfig {
                    max_entries: 10,
                    max_load_factor: 0.5,
                },
                DefaultHashBuilder::default(),
            )
            .unwrap();
        cache.insert("k", 1, 1_000_000).unwrap();
        assert_eq!(cache.get(&"k").unwrap(), Some(1));
    }
}
