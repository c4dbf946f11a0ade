//! TTL + LRU cache controller.
//!
//! Combines the open-addressing slot table with the doubly linked
//! recency list and a caller-driven tick clock. All operations are
//! O(cluster length), which stays expected-O(1) under the enforced
//! load bound.
//!
//! # Data structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         TtlCache                             │
//! │                                                              │
//! │  Table (open addressing)        Recency list                 │
//! │  ┌────┬────┬────┬────┬────┐    ┌──────────────────────────┐  │
//! │  │    │ #a │ #b │    │ #c │    │ newest ◀──▶ ... ◀──▶ old │  │
//! │  └────┴─┬──┴─┬──┴────┴─┬──┘    └──▲───────▲───────────▲───┘  │
//! │         │    │         │          │       │           │      │
//! │         └────┼─────────┼──────────┘       │           │      │
//! │              └─────────┼──────────────────┘           │      │
//! │                        └──────────────────────────────┘      │
//! │  slot = {entry node, hash, expiration}                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each slot stores a pointer to a list node, the key's hash, and the
//! absolute expiration. Both removal drivers — TTL expiry and LRU
//! eviction — funnel through the same *cluster repair*: expired slots
//! are dropped in one forward pass, then survivors slide left toward
//! their ideal index, restoring the open-addressing invariant. LRU
//! eviction reuses the machinery by stamping the victim's slot with an
//! expiration below every legal timestamp.
//!
//! # Operations
//!
//! | Operation | Action |
//! |-----------|--------|
//! | `get(key, t)` | Repair the key's cluster, then look up; hits move to newest |
//! | `insert(key, v, t, ttl)` | Repair, update in place or evict-then-write |
//! | `remove_expired(t, ratio)` | Sample random clusters until the expired ratio drops below `ratio` |
//!
//! # Clock
//!
//! Every operation takes an explicit tick timestamp and advances the
//! internal clock to it; a timestamp earlier than the clock is an
//! error and the clock never moves backward. A slot is expired once
//! `expiration <= clock`.

use crate::config::TtlCacheConfig;
use crate::entry::CacheEntry;
use crate::error::{CacheError, Result};
use crate::list::List;
use crate::metrics::TtlCacheMetrics;
use crate::table::Table;
use crate::Timestamp;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::DefaultHashBuilder;
use hashbrown::HashSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// `remove_expired` stops once fewer than this fraction of slots is
/// occupied; random draws would mostly hit vacant slots below it.
pub const SWEEP_MIN_LOAD_FACTOR: f64 = 0.10;

/// `remove_expired` stops below this many live entries, and each
/// sampling round draws at least this many slot indices.
pub const SWEEP_MIN_SAMPLE: usize = 20;

/// Lowest accepted target ratio for `remove_expired`; chasing a
/// smaller ratio makes the sweep's work unbounded.
pub const SWEEP_MIN_TARGET_RATIO: f64 = 0.01;

/// Expiration stamped on a slot to force it through cluster repair.
/// Legal timestamps are non-negative, so this always compares expired.
const EVICTED: Timestamp = -2;

#[cfg(feature = "std")]
fn default_seed() -> u64 {
    rand::random()
}

#[cfg(not(feature = "std"))]
fn default_seed() -> u64 {
    // No entropy source without std; sampling quality does not affect
    // correctness, only which clusters a sweep visits first.
    0x9e37_79b9_7f4a_7c15
}

/// Bounded LRU cache with per-entry TTL expiration.
///
/// Holds at most `max_entries` live entries in a fixed table of
/// `⌈max_entries / max_load_factor⌉` slots. Reads and writes refresh
/// recency; a write that would exceed the bound evicts the least
/// recently used entry; expired entries are dropped lazily whenever
/// their cluster is touched and actively by [`TtlCache::remove_expired`].
///
/// # Type Parameters
///
/// - `K`: key type, `Hash + Eq`
/// - `V`: value type; `Clone` because lookups return values by copy
/// - `S`: hash builder, defaults to `hashbrown`'s
///
/// # Example
///
/// ```
/// use ttl_cache_rs::TtlCache;
///
/// let mut cache = TtlCache::new(2, 0.5).unwrap();
/// cache.insert("a", 1, 1, 100).unwrap();
/// cache.insert("b", 2, 2, 100).unwrap();
/// cache.insert("c", 3, 3, 100).unwrap(); // evicts "a"
///
/// assert_eq!(cache.get(&"a", 4).unwrap(), None);
/// assert_eq!(cache.get(&"c", 5).unwrap(), Some(3));
/// ```
pub struct TtlCache<K, V, S = DefaultHashBuilder> {
    config: TtlCacheConfig,
    table: Table<K, V>,
    list: List<CacheEntry<K, V>>,
    hash_builder: S,
    rng: SmallRng,
    current_time: Timestamp,
    metrics: TtlCacheMetrics,
}

// SAFETY: TtlCache owns all data; raw pointers in the table refer only
// to nodes owned by `list`. Sending the whole cache moves both sides.
unsafe impl<K: Send, V: Send, S: Send> Send for TtlCache<K, V, S> {}

// SAFETY: all mutation requires &mut self; shared references cannot
// cause data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for TtlCache<K, V, S> {}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// Creates a cache with the default hash builder.
    ///
    /// Fails with [`CacheError::TooFewEntries`] for `max_entries < 2`
    /// and [`CacheError::LoadFactorOutOfRange`] for a load factor
    /// outside `[0.01, 0.5]`.
    pub fn new(max_entries: usize, max_load_factor: f64) -> Result<Self> {
        Self::with_hasher(
            TtlCacheConfig {
                max_entries,
                max_load_factor,
            },
            DefaultHashBuilder::default(),
        )
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher> TtlCache<K, V, S> {
    /// Creates a cache from a config, with `None` meaning the default
    /// hash builder.
    pub fn init(config: TtlCacheConfig, hash_builder: Option<S>) -> Result<Self>
    where
        S: Default,
    {
        Self::with_hasher(config, hash_builder.unwrap_or_default())
    }

    /// Creates a cache with a caller-supplied hash builder.
    ///
    /// Use this for deterministic hashing or DoS resistance; the
    /// builder must be pure for the lifetime of the cache, since each
    /// key's hash is stored at insertion and trusted afterwards.
    pub fn with_hasher(config: TtlCacheConfig, hash_builder: S) -> Result<Self> {
        Self::with_hasher_and_seed(config, hash_builder, default_seed())
    }

    /// Creates a cache with a pinned sampling seed, making the slot
    /// draws of [`TtlCache::remove_expired`] reproducible.
    pub fn with_hasher_and_seed(
        config: TtlCacheConfig,
        hash_builder: S,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        Ok(TtlCache {
            table: Table::new(config.capacity()),
            list: List::new(),
            hash_builder,
            rng: SmallRng::seed_from_u64(seed),
            current_time: 0,
            metrics: TtlCacheMetrics::new(),
            config,
        })
    }

    /// Number of live entries, counting expired-but-unswept ones.
    #[inline]
    pub fn size(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Number of table slots, fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Current `size / capacity`.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.size() as f64 / self.capacity() as f64
    }

    /// The cache clock: the largest timestamp seen so far.
    #[inline]
    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    /// Counters accumulated since construction.
    #[inline]
    pub fn metrics(&self) -> &TtlCacheMetrics {
        &self.metrics
    }

    /// Looks up a key, refreshing its recency on a hit.
    ///
    /// The cluster around the key's ideal slot is repaired first, so
    /// an expired entry is gone before the lookup sees it — a `get` at
    /// or past the expiration tick returns `None`.
    ///
    /// Fails with [`CacheError::TimestampRegression`] if `timestamp`
    /// is earlier than the cache clock.
    pub fn get<Q>(&mut self, key: &Q, timestamp: Timestamp) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if timestamp < self.current_time {
            return Err(CacheError::TimestampRegression {
                given: timestamp,
                current: self.current_time,
            });
        }

        let hash = self.hash_builder.hash_one(key);
        let ideal = self.table.ideal_index(hash);
        self.current_time = timestamp;
        self.repair_cluster(ideal);

        let Some(index) = self.table.find(key, hash) else {
            self.metrics.record_miss();
            return Ok(None);
        };
        debug_assert!(!self.table.is_expired(index, self.current_time));

        let node = self.table.node_at(index);
        // SAFETY: occupied slots always reference live list nodes
        let value = unsafe {
            self.list.move_to_front(node);
            let entry = (*node).value_mut();
            entry.touch(timestamp);
            entry.value.clone()
        };
        self.metrics.record_hit();
        Ok(Some(value))
    }

    /// Inserts or overwrites a key, making it the newest entry.
    ///
    /// The absolute expiration becomes `timestamp + ttl`. Overwriting
    /// an existing key never changes `size`; inserting a new key into
    /// a full cache first evicts the oldest entry.
    ///
    /// Fails with [`CacheError::TimestampRegression`] or
    /// [`CacheError::NonPositiveTtl`]; on error nothing is mutated.
    pub fn insert(&mut self, key: K, value: V, timestamp: Timestamp, ttl: i64) -> Result<()> {
        if timestamp < self.current_time {
            return Err(CacheError::TimestampRegression {
                given: timestamp,
                current: self.current_time,
            });
        }
        if ttl <= 0 {
            return Err(CacheError::NonPositiveTtl(ttl));
        }

        let hash = self.hash_builder.hash_one(&key);
        let ideal = self.table.ideal_index(hash);
        self.current_time = timestamp;
        self.repair_cluster(ideal);

        if let Some(index) = self.table.find(&key, hash) {
            self.table.set_expiration(index, timestamp.saturating_add(ttl));
            let node = self.table.node_at(index);
            // SAFETY: occupied slots always reference live list nodes
            unsafe {
                self.list.move_to_front(node);
                let entry = (*node).value_mut();
                entry.value = value;
                entry.touch(timestamp);
            }
            self.metrics.record_update();
            return Ok(());
        }

        if (self.size() + 1) as f64 > self.config.max_load_factor * self.capacity() as f64 {
            self.evict_oldest();
        }

        let index = self.table.next_vacant(ideal);
        let node = self.list.push_front(CacheEntry::new(key, value, timestamp));
        self.table
            .occupy(index, node, hash, timestamp.saturating_add(ttl));
        self.metrics.record_insertion();

        #[cfg(debug_assertions)]
        {
            // SAFETY: node was just linked into the list
            let key_ref = unsafe { &(*node).value().key };
            debug_assert!(self.table.find(key_ref, hash).is_some());
        }
        Ok(())
    }

    /// Sampled active expiration, modeled on Redis.
    ///
    /// Repeatedly draws random occupied slots, pulls in their whole
    /// clusters, and repairs them, until a round's measured expired
    /// ratio is at or below `target_ratio`. Clusters are sampled whole
    /// because expired entries aggregate exactly where clusters grow,
    /// and each repair then amortizes its cost over the cluster.
    ///
    /// Stops early once fewer than [`SWEEP_MIN_SAMPLE`] entries remain
    /// or occupancy drops under [`SWEEP_MIN_LOAD_FACTOR`], where the
    /// sample would be too expensive to draw or statistically
    /// meaningless.
    ///
    /// Fails with [`CacheError::TimestampRegression`] or, for
    /// `target_ratio < 0.01`, [`CacheError::TargetRatioTooLow`].
    pub fn remove_expired(&mut self, timestamp: Timestamp, target_ratio: f64) -> Result<()> {
        if timestamp < self.current_time {
            return Err(CacheError::TimestampRegression {
                given: timestamp,
                current: self.current_time,
            });
        }
        if !(target_ratio >= SWEEP_MIN_TARGET_RATIO) {
            return Err(CacheError::TargetRatioTooLow(target_ratio));
        }
        self.current_time = timestamp;

        loop {
            let size_before = self.size();
            if (size_before as f64) < SWEEP_MIN_LOAD_FACTOR * self.capacity() as f64
                || size_before < SWEEP_MIN_SAMPLE
            {
                return Ok(());
            }

            let mut sample: HashSet<usize> = HashSet::with_capacity(2 * SWEEP_MIN_SAMPLE);
            while sample.len() < SWEEP_MIN_SAMPLE {
                let drawn = self.rng.random_range(0..self.capacity());
                if self.table.is_vacant(drawn) || sample.contains(&drawn) {
                    continue;
                }
                // The whole cluster joins the sample before the repair
                // empties parts of it, so the denominator counts every
                // slot actually scrutinized.
                let mut i = self.table.cluster_start(drawn);
                while !self.table.is_vacant(i) {
                    sample.insert(i);
                    i = self.table.next_index(i);
                }
                self.repair_cluster(drawn);
            }

            let removed = size_before - self.size();
            self.metrics.record_sweep_round(sample.len() as u64);
            let expired_ratio = removed as f64 / sample.len() as f64;
            if expired_ratio <= target_ratio {
                return Ok(());
            }
        }
    }

    /// Visits live entries from oldest to newest.
    ///
    /// Expired-but-unswept entries are included; order reflects the
    /// recency list, not the table.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list
            .iter_oldest_first()
            .map(|entry| (&entry.key, &entry.value))
    }

    /// Keys from oldest to newest.
    pub fn lru_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Drops every entry. The clock is not rewound.
    pub fn clear(&mut self) {
        self.table.clear();
        self.list.clear();
    }

    /// Repairs the cluster containing `index`, if any.
    ///
    /// Pass 1 walks the cluster start-to-end and drops every expired
    /// slot. Pass 2 walks from the first hole and moves each survivor
    /// to the first vacant slot at or after its ideal index, if that
    /// lands strictly earlier in its probe sequence. Moving entries
    /// only earlier can never break the probe path of another entry,
    /// so a single left-to-right pass restores the invariant for the
    /// whole cluster.
    fn repair_cluster(&mut self, index: usize) {
        if self.table.is_vacant(index) {
            return;
        }

        let start = self.table.cluster_start(index);
        let mut first_removed = None;
        let mut i = start;
        while !self.table.is_vacant(i) {
            if self.table.is_expired(i, self.current_time) {
                self.remove_slot(i);
                if first_removed.is_none() {
                    first_removed = Some(i);
                }
            }
            i = self.table.next_index(i);
        }

        let Some(first) = first_removed else {
            return;
        };
        let cluster_end = i;

        let mut i = self.table.next_index(first);
        while i != cluster_end {
            if !self.table.is_vacant(i) {
                debug_assert!(!self.table.is_expired(i, self.current_time));
                let ideal = self.table.ideal_index(self.table.hash_at(i));
                if ideal != i {
                    let mut target = ideal;
                    while target != i && !self.table.is_vacant(target) {
                        target = self.table.next_index(target);
                    }
                    if target != i {
                        self.table.relocate(i, target);
                    }
                }
            }
            i = self.table.next_index(i);
        }
    }

    /// Drops the entry at an occupied slot without any relocation.
    fn remove_slot(&mut self, index: usize) {
        if self.table.expire_at(index) == EVICTED {
            self.metrics.record_eviction();
        } else {
            self.metrics.record_expiration();
        }
        let node = self.table.vacate(index);
        // SAFETY: the node came out of an occupied slot, so it is a
        // live member of the list; dropping the returned value frees it
        unsafe {
            self.list.remove(node);
        }
    }

    /// Removes the least recently used entry through cluster repair.
    ///
    /// The victim's slot gets an expiration below every legal
    /// timestamp, and the ordinary repair then removes and relocates —
    /// both removal drivers share one code path.
    fn evict_oldest(&mut self) {
        let index = {
            let oldest = self
                .list
                .back()
                .expect("eviction requested on an empty cache");
            let hash = self.hash_builder.hash_one(&oldest.key);
            match self.table.find(&oldest.key, hash) {
                Some(index) => index,
                None => unreachable!("oldest entry missing from the table"),
            }
        };
        self.table.set_expiration(index, EVICTED);
        self.repair_cluster(index);
    }

    /// Panics unless every structural invariant holds.
    ///
    /// Walks the whole table and list; meant for tests and debugging,
    /// not for production call sites.
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        let capacity = self.capacity();
        let mut occupied = 0;
        for i in 0..capacity {
            if self.table.is_vacant(i) {
                continue;
            }
            occupied += 1;

            let node = self.table.node_at(i);
            // SAFETY: occupied slots always reference live list nodes
            let entry = unsafe { (*node).value() };
            let hash = self.table.hash_at(i);
            assert_eq!(
                hash,
                self.hash_builder.hash_one(&entry.key),
                "stored hash does not match the key"
            );

            // No vacant slot may separate the entry from its ideal index.
            let mut j = self.table.ideal_index(hash);
            while j != i {
                assert!(
                    !self.table.is_vacant(j),
                    "vacant slot between ideal index and slot {i}"
                );
                j = self.table.next_index(j);
            }

            // Probing must reach exactly this slot, which also rules
            // out duplicate keys earlier in the probe sequence.
            assert_eq!(
                self.table.find(&entry.key, hash),
                Some(i),
                "entry unreachable by probing"
            );
        }

        assert_eq!(occupied, self.list.len(), "table and list sizes disagree");
        assert_eq!(
            self.list.iter_oldest_first().count(),
            occupied,
            "list length does not match its traversal"
        );
        assert!(
            occupied as f64 <= self.config.max_load_factor * capacity as f64,
            "load bound exceeded"
        );

        for entry in self.list.iter_oldest_first() {
            let hash = self.hash_builder.hash_one(&entry.key);
            assert!(
                self.table.find(&entry.key, hash).is_some(),
                "listed entry missing from the table"
            );
        }
    }
}

impl<K, V, S> fmt::Debug for TtlCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("size", &self.list.len())
            .field("capacity", &self.table.capacity())
            .field("current_time", &self.current_time)
            .finish()
    }
}
