//! Eviction Policy Comparison
//!
//! Runs one small workload through LRU, FIFO and LFU and prints which keys
//! each policy evicted, followed by each cache's metrics.
//!
//! Run with: cargo run --example policy_comparison

use policy_cache::metrics::CacheMetrics;
use policy_cache::{EvictionPolicy, PolicyCache};
use std::num::NonZeroUsize;

fn run(policy: EvictionPolicy) -> PolicyCache<&'static str, u32> {
    let mut cache = PolicyCache::new(NonZeroUsize::new(3).unwrap(), policy);

    cache.put("apple", 1);
    cache.put("banana", 2);
    cache.put("cherry", 3);

    cache.get(&"apple");
    cache.get(&"apple");
    cache.get(&"banana");
    cache.get(&"durian");

    let mut evicted = Vec::new();
    for (key, value) in [("date", 4), ("elderberry", 5)] {
        if let Some((victim, _)) = cache.put(key, value) {
            evicted.push(victim);
        }
    }

    println!("{policy:<5} evicted {:?}", evicted);
    cache
}

fn main() {
    println!("Eviction Policy Comparison");
    println!("==========================\n");
    println!("capacity 3: put apple, banana, cherry; get apple x2, banana; put date, elderberry\n");

    let caches: Vec<PolicyCache<&'static str, u32>> =
        EvictionPolicy::ALL.into_iter().map(run).collect();

    println!();
    for cache in &caches {
        println!("{} metrics:", cache.algorithm_name());
        for (name, value) in cache.metrics() {
            println!("  {name:<28} {value:>8.3}");
        }
        println!();
    }
}
