//! Configuration for the TTL + LRU cache.
//!
//! The configuration is a plain struct with public fields; validation
//! happens when a cache is constructed from it.
//!
//! # Examples
//!
//! ```
//! use ttl_cache_rs::{TtlCache, TtlCacheConfig};
//!
//! let config = TtlCacheConfig {
//!     max_entries: 100,
//!     max_load_factor: 0.5,
//! };
//! let cache: TtlCache<String, i32> = TtlCache::init(config, None).unwrap();
//! assert_eq!(cache.capacity(), 200);
//! ```

use crate::error::{CacheError, Result};
use core::fmt;

/// Minimum number of live entries a cache must be able to hold.
pub const MIN_ENTRIES: usize = 2;

/// Lowest accepted `max_load_factor`. Below this the table would be
/// absurdly sparse and the derived capacity explodes.
pub const MIN_LOAD_FACTOR: f64 = 0.01;

/// Highest accepted `max_load_factor`. Linear probing degrades sharply
/// past half-full tables, and cluster repair relies on clusters staying
/// short relative to the table.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// Configuration for a [`TtlCache`](crate::TtlCache).
///
/// # Fields
///
/// - `max_entries`: maximum number of live entries the cache holds
/// - `max_load_factor`: bound on `live entries / table capacity`
///
/// The table capacity is derived as `⌈max_entries / max_load_factor⌉`
/// and fixed for the lifetime of the cache.
#[derive(Clone, Copy)]
pub struct TtlCacheConfig {
    /// Maximum number of live key-value pairs.
    pub max_entries: usize,
    /// Maximum fraction of table slots that may be occupied.
    pub max_load_factor: f64,
}

impl TtlCacheConfig {
    /// Checks the construction bounds.
    ///
    /// Rejects `max_entries < 2` and any `max_load_factor` outside
    /// `[0.01, 0.5]` (NaN included).
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR).contains(&self.max_load_factor) {
            return Err(CacheError::LoadFactorOutOfRange(self.max_load_factor));
        }
        if self.max_entries < MIN_ENTRIES {
            return Err(CacheError::TooFewEntries(self.max_entries));
        }
        Ok(())
    }

    /// Number of table slots: `⌈max_entries / max_load_factor⌉`.
    ///
    /// Computed without `f64::ceil`, which is unavailable without `std`.
    pub fn capacity(&self) -> usize {
        let exact = self.max_entries as f64 / self.max_load_factor;
        let mut capacity = exact as usize;
        if (capacity as f64) < exact {
            capacity += 1;
        }
        capacity
    }
}

impl fmt::Debug for TtlCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCacheConfig")
            .field("max_entries", &self.max_entries)
            .field("max_load_factor", &self.max_load_factor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = TtlCacheConfig {
            max_entries: 5,
            max_load_factor: 0.5,
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(), 10);
    }

    #[test]
    fn test_capacity_rounds_up() {
        let config = TtlCacheConfig {
            max_entries: 7,
            max_load_factor: 0.3,
        };
        // 7 / 0.3 = 23.33...
        assert_eq!(config.capacity(), 24);
    }

    #[test]
    fn test_rejects_too_few_entries() {
        let config = TtlCacheConfig {
            max_entries: 1,
            max_load_factor: 0.5,
        };
        assert_eq!(config.validate(), Err(CacheError::TooFewEntries(1)));
    }

    #[test]
    fn test_rejects_load_factor_out_of_range() {
        for bad in [0.0, 0.009, 0.51, 1.0, f64::NAN] {
            let config = TtlCacheConfig {
                max_entries: 10,
                max_load_factor: bad,
            };
            assert!(matches!(
                config.validate(),
                Err(CacheError::LoadFactorOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_boundary_load_factors_accepted() {
        for ok in [0.01, 0.5] {
            let config = TtlCacheConfig {
                max_entries: 2,
                max_load_factor: ok,
            };
            assert!(config.validate().is_ok());
        }
        let sparse = TtlCacheConfig {
            max_entries: 2,
            max_load_factor: 0.01,
        };
        assert_eq!(sparse.capacity(), 200);
    }
}
