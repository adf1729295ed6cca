//! Concurrent Cache Benchmarks
//!
//! Measures the single-lock wrapper under read-heavy, write-heavy and mixed
//! traffic at several thread counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use policy_cache::{ConcurrentPolicyCache, EvictionPolicy};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

const CACHE_SIZE: usize = 10_000;
const OPS_PER_THREAD: usize = 1_000;
const THREAD_COUNTS: [usize; 3] = [1, 4, 8];

fn filled_cache(policy: EvictionPolicy) -> Arc<ConcurrentPolicyCache<usize, usize>> {
    let cache = Arc::new(ConcurrentPolicyCache::new(
        NonZeroUsize::new(CACHE_SIZE).unwrap(),
        policy,
    ));
    for i in 0..CACHE_SIZE {
        cache.put(i, i);
    }
    cache
}

fn run_threads<F>(cache: &Arc<ConcurrentPolicyCache<usize, usize>>, num_threads: usize, op: F)
where
    F: Fn(&ConcurrentPolicyCache<usize, usize>, usize, usize) + Send + Sync + Copy + 'static,
{
    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let cache = Arc::clone(cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    op(&cache, t, i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }
}

/// Benchmark concurrent read operations for every policy
fn concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Reads");

    for policy in EvictionPolicy::ALL {
        let cache = filled_cache(policy);
        for threads in THREAD_COUNTS {
            group.throughput(Throughput::Elements((threads * OPS_PER_THREAD) as u64));
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        run_threads(&cache, threads, |cache, t, i| {
                            black_box(cache.get(&((t * OPS_PER_THREAD + i) % CACHE_SIZE)));
                        });
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark concurrent writes; most of them evict
fn concurrent_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Writes");

    for policy in EvictionPolicy::ALL {
        let cache = filled_cache(policy);
        for threads in THREAD_COUNTS {
            group.throughput(Throughput::Elements((threads * OPS_PER_THREAD) as u64));
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        run_threads(&cache, threads, |cache, t, i| {
                            let key = CACHE_SIZE + t * OPS_PER_THREAD + i;
                            black_box(cache.put(key, i));
                        });
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark 75% reads / 20% writes / 5% erases
fn concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed");

    for policy in EvictionPolicy::ALL {
        let cache = filled_cache(policy);
        for threads in THREAD_COUNTS {
            group.throughput(Throughput::Elements((threads * OPS_PER_THREAD) as u64));
            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        run_threads(&cache, threads, |cache, t, i| {
                            let key = (t * 7_919 + i * 31) % (CACHE_SIZE * 2);
                            match i % 20 {
                                0..=14 => {
                                    black_box(cache.get(&key));
                                }
                                15..=18 => {
                                    black_box(cache.put(key, i));
                                }
                                _ => {
                                    black_box(cache.erase(&key));
                                }
                            }
                        });
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    concurrent_reads,
    concurrent_writes,
    concurrent_mixed
);
criterion_main!(benches);
