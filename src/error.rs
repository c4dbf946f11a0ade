//! Error types for the cache.
//!
//! All fallible surface area boils down to argument validation: bad
//! construction bounds, a timestamp earlier than the cache clock, a
//! non-positive TTL, or an active-expiry target ratio below the
//! supported floor. Broken internal invariants are bugs and panic
//! rather than returning an error.

use crate::Timestamp;
use thiserror::Error;

/// Unified error type for cache operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CacheError {
    /// `max_entries` below the minimum of 2.
    #[error("max_entries must be at least 2, got {0}")]
    TooFewEntries(usize),

    /// `max_load_factor` outside the accepted `[0.01, 0.5]` range.
    #[error("max_load_factor must lie in [0.01, 0.5], got {0}")]
    LoadFactorOutOfRange(f64),

    /// A timestamp earlier than one already observed.
    #[error("timestamp {given} is earlier than the cache clock {current}")]
    TimestampRegression {
        /// The rejected timestamp.
        given: Timestamp,
        /// The cache clock at the time of the call.
        current: Timestamp,
    },

    /// A TTL that would expire the entry on arrival.
    #[error("ttl must be positive, got {0}")]
    NonPositiveTtl(i64),

    /// An active-expiry target ratio below 0.01, which would allow
    /// unbounded sweep work.
    #[error("target ratio {0} is below the supported floor of 0.01")]
    TargetRatioTooLow(f64),
}

/// Convenience `Result` alias for cache operations.
pub type Result<T> = core::result::Result<T, CacheError>;
