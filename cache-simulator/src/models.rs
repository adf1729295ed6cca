// Data models for cache simulation

use policy_cache::EvictionPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// One line of a request log: `timestamp,key,size,ttl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unix timestamp in seconds
    pub timestamp: u64,
    /// Cache key
    pub key: String,
    /// Size of the object in bytes
    pub size: usize,
    /// Time-to-live in seconds (0 means no TTL). Carried through but not simulated.
    #[serde(default)]
    pub ttl: u64,
}

impl Request {
    pub fn new(timestamp: u64, key: impl Into<String>, size: usize, ttl: u64) -> Self {
        Self {
            timestamp,
            key: key.into(),
            size,
            ttl,
        }
    }
}

/// Cache implementations the simulator can replay a trace against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheAlgorithm {
    Lru,
    Fifo,
    Lfu,
    /// The `lru` crate, used as a baseline for the LRU numbers
    ReferenceLru,
}

impl CacheAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheAlgorithm::Lru => "LRU",
            CacheAlgorithm::Fifo => "FIFO",
            CacheAlgorithm::Lfu => "LFU",
            CacheAlgorithm::ReferenceLru => "RefLRU",
        }
    }

    /// Get all available algorithms
    pub fn all() -> Vec<CacheAlgorithm> {
        vec![
            CacheAlgorithm::Lru,
            CacheAlgorithm::Fifo,
            CacheAlgorithm::Lfu,
            CacheAlgorithm::ReferenceLru,
        ]
    }

    /// The library policy behind this algorithm, if it is one of ours.
    pub fn policy(&self) -> Option<EvictionPolicy> {
        match self {
            CacheAlgorithm::Lru => Some(EvictionPolicy::Lru),
            CacheAlgorithm::Fifo => Some(EvictionPolicy::Fifo),
            CacheAlgorithm::Lfu => Some(EvictionPolicy::Lfu),
            CacheAlgorithm::ReferenceLru => None,
        }
    }
}

impl fmt::Display for CacheAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CacheAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lru" => Ok(CacheAlgorithm::Lru),
            "fifo" => Ok(CacheAlgorithm::Fifo),
            "lfu" => Ok(CacheAlgorithm::Lfu),
            "reference-lru" | "ref-lru" | "reflru" => Ok(CacheAlgorithm::ReferenceLru),
            other => Err(format!("unknown algorithm '{other}'")),
        }
    }
}

/// Cache execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheMode {
    /// Plain `PolicyCache` driven from one thread
    Sequential,
    /// `ConcurrentPolicyCache` shared by the worker threads
    Concurrent,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::Sequential => "Sequential",
            CacheMode::Concurrent => "Concurrent",
        }
    }

    /// Parses `sequential`, `concurrent` or `both` into the modes to run.
    pub fn parse_list(mode: &str) -> Result<Vec<CacheMode>, String> {
        match mode.trim().to_lowercase().as_str() {
            "sequential" | "seq" => Ok(vec![CacheMode::Sequential]),
            "concurrent" | "conc" => Ok(vec![CacheMode::Concurrent]),
            "both" | "all" => Ok(vec![CacheMode::Sequential, CacheMode::Concurrent]),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unique identifier for a simulation run combining algorithm and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulationKey {
    pub algorithm: CacheAlgorithm,
    pub mode: CacheMode,
}

impl SimulationKey {
    pub fn new(algorithm: CacheAlgorithm, mode: CacheMode) -> Self {
        Self { algorithm, mode }
    }
}

impl fmt::Display for SimulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.algorithm.as_str(), self.mode.as_str())
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Directory containing input log files
    pub input_dir: PathBuf,
    /// Cache capacity in number of entries
    pub capacity: usize,
    /// Algorithms to simulate
    pub algorithms: Vec<CacheAlgorithm>,
    /// Modes to simulate
    pub modes: Vec<CacheMode>,
    /// Worker threads sharing the cache in concurrent mode
    pub thread_count: usize,
}

/// Results of a simulation run
#[derive(Debug)]
pub struct SimulationResult {
    /// Statistics for each algorithm+mode combination
    pub stats: HashMap<SimulationKey, AlgorithmStats>,
    /// Total number of requests processed
    pub total_requests: usize,
    /// Number of unique objects in the dataset
    pub unique_objects: usize,
    /// Duration of the simulation
    pub duration: Duration,
}

/// Statistics for a single algorithm
#[derive(Debug, Default, Clone)]
pub struct AlgorithmStats {
    pub hits: usize,
    pub misses: usize,
    /// Entries evicted to make room for a miss
    pub evictions: usize,
    /// Wall-clock time in milliseconds, including log I/O
    pub simulation_time_ms: u64,
    /// Latency statistics for cache operations (excludes I/O)
    pub latency: LatencyStats,
}

impl AlgorithmStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        percentage(self.hits, self.hits + self.misses)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Latency statistics for a single operation type
#[derive(Debug, Clone, Default)]
pub struct OpLatencyStats {
    /// Total time spent (nanoseconds)
    pub total_ns: u64,
    pub count: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub percentiles: Option<LatencyPercentiles>,
}

impl OpLatencyStats {
    pub fn avg_ns(&self) -> f64 {
        if self.count > 0 {
            self.total_ns as f64 / self.count as f64
        } else {
            0.0
        }
    }

    pub fn ops_per_sec(&self) -> f64 {
        if self.total_ns > 0 {
            (self.count as f64 * 1_000_000_000.0) / self.total_ns as f64
        } else {
            0.0
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_ns as f64 / 1_000_000_000.0
    }

    pub fn p50_ns(&self) -> u64 {
        self.percentiles.as_ref().map(|p| p.p50_ns).unwrap_or(0)
    }

    pub fn p99_ns(&self) -> u64 {
        self.percentiles.as_ref().map(|p| p.p99_ns).unwrap_or(0)
    }
}

/// Latency statistics for all cache operations
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    pub get_stats: OpLatencyStats,
    pub put_stats: OpLatencyStats,
}

impl LatencyStats {
    pub fn count(&self) -> u64 {
        self.get_stats.count + self.put_stats.count
    }

    pub fn total_ns(&self) -> u64 {
        self.get_stats.total_ns + self.put_stats.total_ns
    }

    pub fn avg_ns(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.total_ns() as f64 / n as f64,
        }
    }

    pub fn ops_per_sec(&self) -> f64 {
        match self.total_ns() {
            0 => 0.0,
            ns => (self.count() as f64 * 1_000_000_000.0) / ns as f64,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000_000.0
    }
}

/// Latency percentiles
#[derive(Debug, Clone, Default)]
pub struct LatencyPercentiles {
    pub p50_ns: u64,
    pub p90_ns: u64,
    pub p99_ns: u64,
    pub p999_ns: u64,
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub algorithm: String,
    pub mode: String,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub evictions: usize,
    pub simulation_time_ms: u64,
    pub total_ops: u64,
    pub ops_per_sec: f64,
    pub avg_latency_ns: f64,
    pub get_ops: u64,
    pub get_avg_ns: f64,
    pub get_min_ns: u64,
    pub get_max_ns: u64,
    pub get_p50_ns: u64,
    pub get_p99_ns: u64,
    pub put_ops: u64,
    pub put_avg_ns: f64,
    pub put_min_ns: u64,
    pub put_max_ns: u64,
    pub put_p50_ns: u64,
    pub put_p99_ns: u64,
}

impl CsvResultRow {
    pub fn new(key: SimulationKey, stats: &AlgorithmStats) -> Self {
        let get = &stats.latency.get_stats;
        let put = &stats.latency.put_stats;
        Self {
            algorithm: key.algorithm.as_str().to_string(),
            mode: key.mode.as_str().to_string(),
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            evictions: stats.evictions,
            simulation_time_ms: stats.simulation_time_ms,
            total_ops: stats.latency.count(),
            ops_per_sec: stats.latency.ops_per_sec(),
            avg_latency_ns: stats.latency.avg_ns(),
            get_ops: get.count,
            get_avg_ns: get.avg_ns(),
            get_min_ns: get.min_ns,
            get_max_ns: get.max_ns,
            get_p50_ns: get.p50_ns(),
            get_p99_ns: get.p99_ns(),
            put_ops: put.count,
            put_avg_ns: put.avg_ns(),
            put_min_ns: put.min_ns,
            put_max_ns: put.max_ns,
            put_p50_ns: put.p50_ns(),
            put_p99_ns: put.p99_ns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("lru".parse::<CacheAlgorithm>(), Ok(CacheAlgorithm::Lru));
        assert_eq!(" FIFO ".parse::<CacheAlgorithm>(), Ok(CacheAlgorithm::Fifo));
        assert_eq!(
            "reference-lru".parse::<CacheAlgorithm>(),
            Ok(CacheAlgorithm::ReferenceLru)
        );
        assert!("slru".parse::<CacheAlgorithm>().is_err());
    }

    #[test]
    fn test_algorithm_policy_mapping() {
        assert_eq!(CacheAlgorithm::Lfu.policy(), Some(EvictionPolicy::Lfu));
        assert_eq!(CacheAlgorithm::ReferenceLru.policy(), None);
        assert_eq!(CacheAlgorithm::all().len(), 4);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            CacheMode::parse_list("both"),
            Ok(vec![CacheMode::Sequential, CacheMode::Concurrent])
        );
        assert_eq!(CacheMode::parse_list("conc"), Ok(vec![CacheMode::Concurrent]));
        assert!(CacheMode::parse_list("parallel").is_err());
    }

    #[test]
    fn test_rates_with_no_traffic() {
        let stats = AlgorithmStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.latency.avg_ns(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = AlgorithmStats {
            hits: 3,
            misses: 1,
            ..AlgorithmStats::default()
        };
        assert!((stats.hit_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_simulation_key_display() {
        let key = SimulationKey::new(CacheAlgorithm::Lfu, CacheMode::Concurrent);
        assert_eq!(key.to_string(), "LFU-Concurrent");
    }
}
