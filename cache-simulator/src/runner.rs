//! Simulation runner for cache algorithms
//!
//! Every selected algorithm and mode replays the same request stream. A
//! request is a `get`; a miss is followed by a `put` of the object, the way a
//! read-through cache in front of a slow backend behaves.
//!
//! Sequential mode drives a `PolicyCache` (or the `lru` crate baseline) from
//! one thread. Concurrent mode shares one `ConcurrentPolicyCache` between
//! `thread_count` workers; requests are read in batches and dealt round-robin
//! to the workers, so the interleaving (and therefore the exact hit count)
//! varies from run to run.
//!
//! Logs are streamed, so memory use is proportional to the cache capacity
//! and batch size rather than to the trace.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Instant;

use policy_cache::{ConcurrentPolicyCache, PolicyCache};

use crate::input::{LogReader, RequestIterator};
use crate::models::{
    CacheAlgorithm, CacheMode, LatencyPercentiles, LatencyStats, OpLatencyStats, Request,
    SimulationConfig, SimulationKey, SimulationResult,
};
use crate::stats::SimulationStats;

/// Requests handed to the worker pool at a time in concurrent mode
const BATCH_SIZE: usize = 64 * 1024;

/// Requests between progress lines
const PROGRESS_INTERVAL: usize = 50_000_000;

/// Latency samples kept per operation for percentile estimates
const MAX_LATENCY_SAMPLES: usize = 5000;

/// Tracks latency for a single operation type
#[derive(Debug)]
struct OpLatencyTracker {
    total_ns: u64,
    count: u64,
    min_ns: u64,
    max_ns: u64,
    /// Sample reservoir for percentile calculation
    samples: Vec<u64>,
}

impl OpLatencyTracker {
    fn new() -> Self {
        Self {
            total_ns: 0,
            count: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            samples: Vec::with_capacity(MAX_LATENCY_SAMPLES),
        }
    }

    #[inline]
    fn record(&mut self, latency_ns: u64) {
        self.total_ns += latency_ns;
        self.count += 1;
        self.min_ns = self.min_ns.min(latency_ns);
        self.max_ns = self.max_ns.max(latency_ns);

        // reservoir sampling keeps every observation equally likely to survive
        if self.samples.len() < MAX_LATENCY_SAMPLES {
            self.samples.push(latency_ns);
        } else {
            let slot = rand::random::<u64>() % self.count;
            if (slot as usize) < MAX_LATENCY_SAMPLES {
                self.samples[slot as usize] = latency_ns;
            }
        }
    }

    fn merge(&mut self, other: OpLatencyTracker) {
        self.total_ns += other.total_ns;
        self.count += other.count;
        self.min_ns = self.min_ns.min(other.min_ns);
        self.max_ns = self.max_ns.max(other.max_ns);
        self.samples.extend(other.samples);
        if self.samples.len() > MAX_LATENCY_SAMPLES {
            // drop a random subset rather than the tail of one worker
            for i in 0..self.samples.len() {
                let j = i + rand::random::<usize>() % (self.samples.len() - i);
                self.samples.swap(i, j);
            }
            self.samples.truncate(MAX_LATENCY_SAMPLES);
        }
    }

    fn percentiles(&mut self) -> Option<LatencyPercentiles> {
        if self.samples.is_empty() {
            return None;
        }
        self.samples.sort_unstable();
        let len = self.samples.len();
        let at = |pct: usize| self.samples[(len * pct / 1000).min(len - 1)];

        Some(LatencyPercentiles {
            p50_ns: at(500),
            p90_ns: at(900),
            p99_ns: at(990),
            p999_ns: at(999),
        })
    }

    fn finalize(mut self) -> OpLatencyStats {
        let percentiles = self.percentiles();
        OpLatencyStats {
            total_ns: self.total_ns,
            count: self.count,
            min_ns: if self.count == 0 { 0 } else { self.min_ns },
            max_ns: self.max_ns,
            percentiles,
        }
    }
}

/// Counters gathered by one thread while replaying requests
#[derive(Debug)]
struct ReplayTally {
    hits: usize,
    misses: usize,
    evictions: usize,
    gets: OpLatencyTracker,
    puts: OpLatencyTracker,
}

impl ReplayTally {
    fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            evictions: 0,
            gets: OpLatencyTracker::new(),
            puts: OpLatencyTracker::new(),
        }
    }

    /// Replays one request: `get`, then `put` on a miss.
    #[inline]
    fn replay<T: ReplayTarget>(&mut self, request: &Request, cache: &mut T) {
        let start = Instant::now();
        let hit = cache.get(&request.key);
        self.gets.record(start.elapsed().as_nanos() as u64);

        if hit {
            self.hits += 1;
            return;
        }

        self.misses += 1;

        let value = u32::try_from(request.size).unwrap_or(u32::MAX);
        let start = Instant::now();
        let evicted = cache.put(request.key.clone(), value);
        self.puts.record(start.elapsed().as_nanos() as u64);
        if evicted {
            self.evictions += 1;
        }
    }

    fn merge(&mut self, other: ReplayTally) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
        self.gets.merge(other.gets);
        self.puts.merge(other.puts);
    }

    fn latency(self) -> LatencyStats {
        LatencyStats {
            get_stats: self.gets.finalize(),
            put_stats: self.puts.finalize(),
        }
    }
}

/// A cache the replay loop can drive
trait ReplayTarget {
    fn get(&mut self, key: &str) -> bool;

    /// Inserts a key known to be absent; returns whether something was evicted.
    fn put(&mut self, key: String, value: u32) -> bool;
}

/// Single-threaded caches the simulator can drive
enum SequentialCache {
    Policy(PolicyCache<String, u32>),
    Reference(lru::LruCache<String, u32>),
}

impl SequentialCache {
    fn new(algorithm: CacheAlgorithm, capacity: NonZeroUsize) -> Self {
        match algorithm.policy() {
            Some(policy) => SequentialCache::Policy(PolicyCache::new(capacity, policy)),
            None => SequentialCache::Reference(lru::LruCache::new(capacity)),
        }
    }

    fn len(&self) -> usize {
        match self {
            SequentialCache::Policy(c) => c.len(),
            SequentialCache::Reference(c) => c.len(),
        }
    }
}

impl ReplayTarget for SequentialCache {
    fn get(&mut self, key: &str) -> bool {
        match self {
            SequentialCache::Policy(c) => c.get(key).is_some(),
            SequentialCache::Reference(c) => c.get(key).is_some(),
        }
    }

    fn put(&mut self, key: String, value: u32) -> bool {
        match self {
            SequentialCache::Policy(c) => c.put(key, value).is_some(),
            SequentialCache::Reference(c) => c.push(key, value).is_some(),
        }
    }
}

impl ReplayTarget for &ConcurrentPolicyCache<String, u32> {
    fn get(&mut self, key: &str) -> bool {
        (**self).get(key).is_some()
    }

    fn put(&mut self, key: String, value: u32) -> bool {
        (**self).put(key, value).is_some()
    }
}

/// Dataset summary gathered in a first streaming pass
#[derive(Debug, Default)]
struct DatasetSummary {
    total_requests: usize,
    unique_objects: usize,
    avg_key_size: usize,
}

/// Runner for cache simulations
#[derive(Debug)]
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// The algorithm/mode pairs that will actually run. The `lru` crate is not
    /// thread-safe, so the reference baseline only runs sequentially.
    pub fn planned_runs(&self) -> Vec<SimulationKey> {
        let mut runs = Vec::new();
        for &algorithm in &self.config.algorithms {
            for &mode in &self.config.modes {
                if algorithm == CacheAlgorithm::ReferenceLru && mode == CacheMode::Concurrent {
                    continue;
                }
                runs.push(SimulationKey::new(algorithm, mode));
            }
        }
        runs
    }

    /// Runs every planned simulation and prints per-run and summary reports.
    pub fn run(&self) -> Result<SimulationResult, String> {
        let capacity = NonZeroUsize::new(self.config.capacity)
            .ok_or_else(|| "cache capacity must be greater than zero".to_string())?;
        let log_reader = LogReader::new(&self.config.input_dir);

        println!("Scanning dataset for statistics...");
        let scan_start = Instant::now();
        let summary = self.scan(&log_reader)?;
        println!("Scan completed in {:.2?}", scan_start.elapsed());

        if summary.total_requests == 0 {
            return Err("No requests found in log files".to_string());
        }

        println!("\nDataset statistics:");
        println!("  Total requests: {}", summary.total_requests);
        println!("  Unique objects: {}", summary.unique_objects);
        println!(
            "  Avg requests per object: {:.2}",
            summary.total_requests as f64 / summary.unique_objects.max(1) as f64
        );
        println!("  Avg key size: {} bytes", summary.avg_key_size);

        let runs = self.planned_runs();
        let mut stats = SimulationStats::new(&runs);
        let start_time = Instant::now();

        for &key in &runs {
            println!("\nRunning {key}...");
            let requests = log_reader
                .stream_requests()
                .map_err(|err| format!("Failed to open log files: {err}"))?;

            let run_start = Instant::now();
            let (tally, final_len) = match key.mode {
                CacheMode::Sequential => {
                    let cache = SequentialCache::new(key.algorithm, capacity);
                    self.run_sequential(cache, requests)?
                }
                CacheMode::Concurrent => {
                    let policy = key
                        .algorithm
                        .policy()
                        .ok_or_else(|| format!("{} has no concurrent variant", key.algorithm))?;
                    let cache = ConcurrentPolicyCache::new(capacity, policy);
                    self.run_concurrent(&cache, requests)?
                }
            };
            let elapsed = run_start.elapsed();

            let processed = tally.hits + tally.misses;
            println!(
                "  Wall time: {:.2?} ({:.0} req/s including I/O), final entries: {}",
                elapsed,
                processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
                final_len
            );

            stats.record_counts(key, tally.hits, tally.misses, tally.evictions);
            stats.record_time(key, elapsed.as_millis() as u64);
            let latency = tally.latency();
            print_latency(&latency);
            stats.record_latency(key, latency);
        }

        stats.print_summary();
        if self.config.modes.len() > 1 {
            stats.print_comparison();
        }
        stats.print_reference_check();

        Ok(stats.result(start_time.elapsed(), summary.unique_objects))
    }

    fn scan(&self, log_reader: &LogReader) -> Result<DatasetSummary, String> {
        let requests = log_reader
            .stream_requests()
            .map_err(|err| format!("Failed to open log files: {err}"))?;

        let mut summary = DatasetSummary::default();
        let mut key_bytes = 0usize;
        let mut unique = HashSet::new();

        for request in requests {
            let request = request.map_err(|err| format!("Failed to parse request: {err}"))?;
            summary.total_requests += 1;
            key_bytes += request.key.len();
            unique.insert(request.key);

            if summary.total_requests % 10_000_000 == 0 {
                println!(
                    "  Scanned {} million requests...",
                    summary.total_requests / 1_000_000
                );
            }
        }

        summary.unique_objects = unique.len();
        summary.avg_key_size = key_bytes / summary.total_requests.max(1);
        Ok(summary)
    }

    fn run_sequential(
        &self,
        mut cache: SequentialCache,
        requests: RequestIterator,
    ) -> Result<(ReplayTally, usize), String> {
        let mut tally = ReplayTally::new();
        let started = Instant::now();

        for (processed, request) in requests.enumerate() {
            let request = request.map_err(|err| format!("Failed to parse request: {err}"))?;
            tally.replay(&request, &mut cache);

            if (processed + 1) % PROGRESS_INTERVAL == 0 {
                report_progress(processed + 1, started);
            }
        }

        let len = cache.len();
        Ok((tally, len))
    }

    fn run_concurrent(
        &self,
        cache: &ConcurrentPolicyCache<String, u32>,
        mut requests: RequestIterator,
    ) -> Result<(ReplayTally, usize), String> {
        let threads = self.config.thread_count.max(1);
        let mut total = ReplayTally::new();
        let mut batch: Vec<Request> = Vec::with_capacity(BATCH_SIZE);
        let mut processed = 0usize;
        let started = Instant::now();

        loop {
            batch.clear();
            for request in requests.by_ref().take(BATCH_SIZE) {
                batch.push(request.map_err(|err| format!("Failed to parse request: {err}"))?);
            }
            if batch.is_empty() {
                break;
            }

            let tallies: Vec<ReplayTally> = thread::scope(|scope| {
                let batch = &batch;
                let handles: Vec<_> = (0..threads)
                    .map(|worker| {
                        scope.spawn(move || {
                            let mut tally = ReplayTally::new();
                            let mut target = cache;
                            for request in batch.iter().skip(worker).step_by(threads) {
                                tally.replay(request, &mut target);
                            }
                            tally
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| handle.join())
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|_| "simulation worker panicked".to_string())?;

            for tally in tallies {
                total.merge(tally);
            }

            let before = processed;
            processed += batch.len();
            if before / PROGRESS_INTERVAL != processed / PROGRESS_INTERVAL {
                report_progress(processed, started);
            }
        }

        Ok((total, cache.len()))
    }
}

fn report_progress(processed: usize, started: Instant) {
    let rate = processed as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON);
    println!(
        "  Processed {} million requests ({:.0} req/s)...",
        processed / 1_000_000,
        rate
    );
}

fn print_latency(latency: &LatencyStats) {
    println!(
        "  Total ops: {} in {:.3}s = {:.0} ops/s (avg {:.0}ns)",
        latency.count(),
        latency.duration_secs(),
        latency.ops_per_sec(),
        latency.avg_ns()
    );
    for (name, op) in [("GET", &latency.get_stats), ("PUT", &latency.put_stats)] {
        if op.count == 0 {
            continue;
        }
        println!(
            "    {name}:  {} ops = {:.0} ops/s | avg={:.0}ns min={} max={} p50={} p99={}",
            op.count,
            op.ops_per_sec(),
            op.avg_ns(),
            op.min_ns,
            op.max_ns,
            op.p50_ns(),
            op.p99_ns()
        );
    }
}
