//! Stress Tests for the Concurrent Cache
//!
//! These tests verify thread safety and correctness under high contention.

#![cfg(feature = "concurrent")]

use policy_cache::config::PolicyCacheConfig;
use policy_cache::metrics::CacheMetrics;
use policy_cache::{ConcurrentPolicyCache, EvictionPolicy};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

fn make_cache(capacity: usize, policy: EvictionPolicy) -> ConcurrentPolicyCache<usize, usize> {
    let config = PolicyCacheConfig {
        capacity: NonZeroUsize::new(capacity).unwrap(),
        policy,
    };
    ConcurrentPolicyCache::init(config, None)
}

/// Many threads hammering the same handful of keys
#[test]
fn stress_high_contention() {
    for policy in EvictionPolicy::ALL {
        let cache = Arc::new(make_cache(100, policy));

        let mut handles = Vec::new();
        for t in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = i % 10;
                    if t % 2 == 0 {
                        cache.put(key, t * OPS_PER_THREAD + i);
                    } else {
                        let _ = cache.get(&key);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert!(cache.len() <= 100);
        cache.check_invariants().unwrap();
    }
}

/// Key space much larger than capacity, so nearly every put evicts
#[test]
fn stress_constant_eviction() {
    for policy in EvictionPolicy::ALL {
        let cache = Arc::new(make_cache(64, policy));

        let mut handles = Vec::new();
        for t in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = t * OPS_PER_THREAD + i;
                    cache.put(key, i);
                    if i % 3 == 0 {
                        let _ = cache.get(&(key / 2));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(cache.len(), 64);
        cache.check_invariants().unwrap();
    }
}

/// Mixed put/get/erase/clear traffic, checked for consistency afterwards
#[test]
fn stress_mixed_operations() {
    for policy in EvictionPolicy::ALL {
        let cache = Arc::new(make_cache(50, policy));
        let hits = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for t in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            let hits = Arc::clone(&hits);
            handles.push(thread::spawn(move || {
                for i in 0..OPS_PER_THREAD / 4 {
                    let key = (t * 31 + i * 7) % 200;
                    match i % 5 {
                        0 | 1 => {
                            cache.put(key, i);
                        }
                        2 | 3 => {
                            if cache.get(&key).is_some() {
                                hits.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        _ => {
                            cache.erase(&key);
                        }
                    }
                    if t == 0 && i % 1_000 == 999 {
                        cache.clear();
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert!(cache.len() <= 50);
        cache.check_invariants().unwrap();

        let metrics = cache.metrics();
        assert_eq!(
            metrics.get("cache_hits").copied(),
            Some(hits.load(Ordering::Relaxed) as f64)
        );
    }
}

/// Zero-copy readers running alongside writers
#[test]
fn stress_get_with_readers() {
    let cache: Arc<ConcurrentPolicyCache<usize, Vec<u8>>> = Arc::new(
        ConcurrentPolicyCache::new(NonZeroUsize::new(32).unwrap(), EvictionPolicy::Lfu),
    );

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD / 10 {
                let key = i % 64;
                if t % 4 == 0 {
                    cache.put(key, vec![key as u8; 16]);
                } else if let Some(len) = cache.get_with(&key, |v| v.len()) {
                    assert_eq!(len, 16);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= 32);
    cache.check_invariants().unwrap();
}

/// Scoped workers borrowing the cache directly, without an `Arc`
#[test]
fn stress_scoped_pool() {
    let cache = make_cache(128, EvictionPolicy::Lru);
    let mut pool = scoped_threadpool::Pool::new(8);

    pool.scoped(|scope| {
        for t in 0..8 {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..2_000 {
                    let key = t * 100 + i % 100;
                    cache.put(key, i);
                    let _ = cache.get(&key);
                }
            });
        }
    });

    assert!(cache.len() <= 128);
    cache.check_invariants().unwrap();

    let inner = cache.into_inner();
    assert_eq!(inner.cap().get(), 128);
}
