//! Property-based tests driving random operation sequences.
//!
//! Every generated sequence runs against a shadow map; after each
//! operation the cache's structural invariants are re-checked, so any
//! sequence that corrupts the table or the recency list shrinks to a
//! minimal reproduction.

use proptest::prelude::*;
use std::collections::HashMap;
use ttl_cache_rs::{TtlCache, TtlCacheConfig};

const MAX_ENTRIES: usize = 16;

#[derive(Debug, Clone)]
enum CacheOp {
    Insert { key: u8, value: u32, advance: i64, ttl: i64 },
    Get { key: u8, advance: i64 },
    Sweep { advance: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (any::<u8>(), any::<u32>(), 0..4i64, 1..64i64)
            .prop_map(|(key, value, advance, ttl)| CacheOp::Insert { key, value, advance, ttl }),
        (any::<u8>(), 0..4i64).prop_map(|(key, advance)| CacheOp::Get { key, advance }),
        (0..4i64).prop_map(|advance| CacheOp::Sweep { advance }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn operation_sequences_preserve_invariants(
        ops in prop::collection::vec(cache_op_strategy(), 1..256),
    ) {
        let config = TtlCacheConfig {
            max_entries: MAX_ENTRIES,
            max_load_factor: 0.5,
        };
        let mut cache: TtlCache<u8, u32> = TtlCache::init(config, None).unwrap();
        let mut shadow: HashMap<u8, (u32, i64)> = HashMap::new();
        let mut now = 0i64;

        for op in ops {
            match op {
                CacheOp::Insert { key, value, advance, ttl } => {
                    now += advance;
                    cache.insert(key, value, now, ttl).unwrap();
                    shadow.insert(key, (value, now + ttl));
                }
                CacheOp::Get { key, advance } => {
                    now += advance;
                    let got = cache.get(&key, now).unwrap();
                    if let Some(value) = got {
                        // A hit must match the live shadow entry.
                        let (shadow_value, expire_at) = shadow[&key];
                        prop_assert_eq!(value, shadow_value);
                        prop_assert!(expire_at > now);
                    }
                }
                CacheOp::Sweep { advance } => {
                    now += advance;
                    cache.remove_expired(now, 0.25).unwrap();
                }
            }

            cache.check_invariants();
            prop_assert!(cache.size() <= MAX_ENTRIES);
            prop_assert_eq!(cache.current_time(), now);
        }
    }

    #[test]
    fn newest_key_is_the_last_touched(
        keys in prop::collection::vec(0..8u8, 2..64),
    ) {
        let config = TtlCacheConfig {
            max_entries: 8,
            max_load_factor: 0.5,
        };
        let mut cache: TtlCache<u8, u8> = TtlCache::init(config, None).unwrap();
        let mut now = 0i64;

        for key in keys {
            now += 1;
            cache.insert(key, key, now, 1_000_000).unwrap();
            prop_assert_eq!(cache.lru_keys().last().copied(), Some(key));
        }
        cache.check_invariants();
    }
}
