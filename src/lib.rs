#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Crate layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`cache`] | [`TtlCache`], the controller combining table, list, and clock |
//! | [`config`] | [`TtlCacheConfig`] and its validation bounds |
//! | [`entry`] | [`CacheEntry`], the key-value record |
//! | [`error`] | [`CacheError`] and the crate [`Result`] alias |
//! | [`metrics`] | Hit/eviction/expiration counters and reporting |
//! | `realtime` | [`RealTimeCache`], the wall-clock shell (`std` only) |

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// The cache controller.
///
/// Owns the slot table, the recency list, the clock, and the sampling
/// RNG, and implements the public `get`/`insert`/`remove_expired`
/// operations on top of cluster repair.
pub mod cache;

/// Cache configuration.
///
/// A plain struct with public fields plus the accepted bounds for each
/// of them; the derived table capacity is computed here.
pub mod config;

/// The key-value record stored per live entry.
pub mod entry;

/// Error types.
///
/// Every fallible operation returns [`CacheError`]; internal invariant
/// violations panic instead of surfacing as errors.
pub mod error;

/// The doubly linked recency list.
///
/// Internal infrastructure built on raw pointers with sentinel nodes.
/// Not exposed directly; use the cache operations instead.
pub(crate) mod list;

/// Cache metrics.
///
/// Plain counters with deterministic `BTreeMap` reporting, so metric
/// dumps are stable across runs.
pub mod metrics;

/// Wall-clock wrapper that generates timestamps from a monotonic clock.
#[cfg(feature = "std")]
pub mod realtime;

/// The open-addressing slot array.
///
/// Internal infrastructure; slots reference list nodes owned by the
/// recency list.
pub(crate) mod table;

pub use cache::{TtlCache, SWEEP_MIN_LOAD_FACTOR, SWEEP_MIN_SAMPLE, SWEEP_MIN_TARGET_RATIO};
pub use config::TtlCacheConfig;
pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use metrics::{CacheMetrics, TtlCacheMetrics};
#[cfg(feature = "std")]
pub use realtime::RealTimeCache;

/// Tick timestamp used throughout the crate.
///
/// Timestamps are opaque orderable scalars supplied by the caller; the
/// cache only requires them to be non-decreasing across calls. The
/// clock starts at 0, so every legal timestamp is non-negative.
pub type Timestamp = i64;
