//! The key-value record stored for each live cache entry.
//!
//! An entry's storage address is stable for its whole lifetime: the
//! slot table and the recency list both point at the same heap node,
//! and table relocations only move slot contents, never the entry.

use crate::Timestamp;
use core::fmt;

/// A live key-value pair.
///
/// Timestamps are the cache's tick clock, not wall time: `created_at`
/// is the tick of the inserting call and `last_accessed` is updated on
/// every read or overwrite. The absolute expiration lives in the table
/// slot next to the precomputed hash, so probing never has to touch
/// the entry for expiry checks.
#[derive(Clone)]
pub struct CacheEntry<K, V> {
    /// The cached key.
    pub key: K,
    /// The cached value.
    pub value: V,
    created_at: Timestamp,
    last_accessed: Timestamp,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates an entry stamped with the inserting call's tick.
    #[inline]
    pub fn new(key: K, value: V, now: Timestamp) -> Self {
        Self {
            key,
            value,
            created_at: now,
            last_accessed: now,
        }
    }

    /// Records an access at the given tick.
    #[inline]
    pub fn touch(&mut self, now: Timestamp) {
        self.last_accessed = now;
    }

    /// Tick of the call that created this entry.
    #[inline]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Tick of the most recent read or overwrite.
    #[inline]
    pub fn last_accessed(&self) -> Timestamp {
        self.last_accessed
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("created_at", &self.created_at)
            .field("last_accessed", &self.last_accessed)
            .finish()
    }
}
