//! Concurrent Cache Usage Examples
//!
//! Multi-threaded usage patterns for `ConcurrentPolicyCache`.
//!
//! Run with: cargo run --example concurrent_usage

extern crate policy_cache;

use policy_cache::config::PolicyCacheConfig;
use policy_cache::metrics::CacheMetrics;
use policy_cache::{ConcurrentPolicyCache, EvictionPolicy};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn config(capacity: usize, policy: EvictionPolicy) -> PolicyCacheConfig {
    PolicyCacheConfig {
        capacity: NonZeroUsize::new(capacity).unwrap(),
        policy,
    }
}

fn main() {
    println!("Concurrent Cache Usage Examples");
    println!("================================\n");

    basic_concurrent_usage();
    println!();

    zero_copy_get_with();
    println!();

    throughput_comparison();
}

/// Basic multi-threaded cache usage
fn basic_concurrent_usage() {
    println!("1. Basic Concurrent Usage");
    println!("   -----------------------");

    let cache = Arc::new(ConcurrentPolicyCache::init(
        config(1000, EvictionPolicy::Lru),
        None,
    ));

    let num_threads = 4;
    let ops_per_thread = 1000;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = format!("thread{}-key{}", thread_id, i);
                    let value = thread_id * 10000 + i;

                    cache.put(key.clone(), value);

                    // another thread may have evicted it in between
                    if let Some(v) = cache.get(&key) {
                        assert_eq!(v, value);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    println!(
        "   Completed {} operations across {} threads",
        num_threads * ops_per_thread * 2,
        num_threads
    );
    println!("   Final cache size: {} items", cache.len());
}

/// Zero-copy access pattern using get_with()
fn zero_copy_get_with() {
    println!("2. Zero-Copy Access with get_with()");
    println!("   ---------------------------------");

    let cache: ConcurrentPolicyCache<String, Vec<u8>> =
        ConcurrentPolicyCache::init(config(100, EvictionPolicy::Lfu), None);

    cache.put("large_blob".to_string(), vec![7u8; 64 * 1024]);

    let checksum = cache.get_with("large_blob", |bytes| {
        bytes.iter().map(|&b| b as u64).sum::<u64>()
    });
    println!("   Checksum computed under the lock: {:?}", checksum);

    cache.get_mut_with("large_blob", |bytes| bytes.truncate(1024));
    println!(
        "   Truncated in place, new length: {:?}",
        cache.get_with("large_blob", Vec::len)
    );
    println!(
        "   Access count so far: {:?}",
        cache.frequency("large_blob")
    );
}

/// Same workload against every policy
fn throughput_comparison() {
    println!("3. Throughput by Policy");
    println!("   --------------------");

    let num_threads = 8;
    let ops_per_thread = 20_000;

    for policy in EvictionPolicy::ALL {
        let cache = Arc::new(ConcurrentPolicyCache::init(config(5_000, policy), None));
        let start = Instant::now();

        let handles: Vec<_> = (0..num_threads)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..ops_per_thread {
                        let key = (t * 131 + i * 17) % 10_000;
                        if i % 4 == 0 {
                            cache.put(key, i);
                        } else {
                            let _ = cache.get(&key);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let elapsed = start.elapsed();
        let total_ops = (num_threads * ops_per_thread) as f64;
        let metrics = cache.metrics();
        println!(
            "   {:<5} {:>10.0} ops/sec   hit rate {:>5.1}%",
            policy,
            total_ops / elapsed.as_secs_f64(),
            metrics.get("hit_rate").copied().unwrap_or(0.0) * 100.0
        );
    }
}
