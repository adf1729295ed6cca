// Statistics collection and reporting for cache simulation

use crate::models::{
    AlgorithmStats, CacheAlgorithm, CacheMode, CsvResultRow, LatencyStats, SimulationKey,
    SimulationResult,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Collects and reports statistics from simulation runs
#[derive(Debug)]
pub struct SimulationStats {
    stats: HashMap<SimulationKey, AlgorithmStats>,
}

impl SimulationStats {
    /// Create a new statistics collector for the given runs
    pub fn new(runs: &[SimulationKey]) -> Self {
        Self {
            stats: runs.iter().map(|&key| (key, AlgorithmStats::new())).collect(),
        }
    }

    /// Rebuild a collector from a finished result (for CSV export after a run)
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            stats: result.stats.clone(),
        }
    }

    pub fn get(&self, key: SimulationKey) -> Option<&AlgorithmStats> {
        self.stats.get(&key)
    }

    /// Record hit/miss counters for a finished run
    pub fn record_counts(
        &mut self,
        key: SimulationKey,
        hits: usize,
        misses: usize,
        evictions: usize,
    ) {
        if let Some(stats) = self.stats.get_mut(&key) {
            stats.hits = hits;
            stats.misses = misses;
            stats.evictions = evictions;
        }
    }

    /// Record simulation time for an algorithm+mode
    pub fn record_time(&mut self, key: SimulationKey, time_ms: u64) {
        if let Some(stats) = self.stats.get_mut(&key) {
            stats.simulation_time_ms = time_ms;
        }
    }

    /// Record latency statistics for an algorithm+mode
    pub fn record_latency(&mut self, key: SimulationKey, latency: LatencyStats) {
        if let Some(stats) = self.stats.get_mut(&key) {
            stats.latency = latency;
        }
    }

    fn sorted_keys(&self) -> Vec<SimulationKey> {
        let mut keys: Vec<_> = self.stats.keys().copied().collect();
        keys.sort();
        keys
    }

    fn total_requests(&self) -> usize {
        self.stats.values().next().map_or(0, |s| s.hits + s.misses)
    }

    pub fn result(&self, duration: Duration, unique_objects: usize) -> SimulationResult {
        SimulationResult {
            stats: self.stats.clone(),
            total_requests: self.total_requests(),
            unique_objects,
            duration,
        }
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        println!("\nCache Simulation Summary");
        println!("========================");
        println!("Total requests: {}", self.total_requests());

        println!("\nResults by Algorithm and Mode:");
        println!(
            "{:<7} {:<10} {:>8} {:>10} {:>12} {:>10} {:>10} {:>10} {:>10}",
            "Algo",
            "Mode",
            "HitRate",
            "Evictions",
            "TotalOps",
            "Ops/sec",
            "GetAvg",
            "PutAvg",
            "GetP99"
        );
        println!("{}", "-".repeat(97));

        for key in self.sorted_keys() {
            let Some(stats) = self.stats.get(&key) else {
                continue;
            };
            println!(
                "{:<7} {:<10} {:>7.2}% {:>10} {:>12} {:>10.0} {:>8.0}ns {:>8.0}ns {:>8}ns",
                key.algorithm,
                key.mode,
                stats.hit_rate(),
                stats.evictions,
                stats.latency.count(),
                stats.latency.ops_per_sec(),
                stats.latency.get_stats.avg_ns(),
                stats.latency.put_stats.avg_ns(),
                stats.latency.get_stats.p99_ns()
            );
        }
    }

    /// Print hit rates of the single-threaded and lock-wrapped runs side by side
    pub fn print_comparison(&self) {
        println!("\n┌─────────────────────────────────────────────────────────────────┐");
        println!("│              Hit-Rate Comparison: Sequential vs Concurrent      │");
        println!("├──────────┬────────────┬────────────┬──────────┬─────────────────┤");
        println!("│ Algorithm│ Sequential │ Concurrent │  Delta   │ Notes           │");
        println!("├──────────┼────────────┼────────────┼──────────┼─────────────────┤");

        let mut algorithms: Vec<CacheAlgorithm> = self.stats.keys().map(|k| k.algorithm).collect();
        algorithms.sort();
        algorithms.dedup();

        for algo in algorithms {
            let seq = self.get(SimulationKey::new(algo, CacheMode::Sequential));
            let conc = self.get(SimulationKey::new(algo, CacheMode::Concurrent));

            match (seq, conc) {
                (Some(seq), Some(conc)) => {
                    let delta = conc.hit_rate() - seq.hit_rate();
                    let notes = if delta.abs() < 0.1 {
                        "~equal"
                    } else {
                        "interleaving"
                    };
                    println!(
                        "│ {:<8} │ {:>9.2}% │ {:>9.2}% │ {:>+7.2}% │ {:<15} │",
                        algo.as_str(),
                        seq.hit_rate(),
                        conc.hit_rate(),
                        delta,
                        notes
                    );
                }
                _ => {
                    println!(
                        "│ {:<8} │ {:>10} │ {:>10} │ {:>8} │ {:<15} │",
                        algo.as_str(),
                        "N/A",
                        "N/A",
                        "N/A",
                        "single mode"
                    );
                }
            }
        }

        println!("└──────────┴────────────┴────────────┴──────────┴─────────────────┘");
        println!("\nNote: the concurrent cache makes the same eviction decisions under one");
        println!("lock; differences come only from how worker threads interleave requests.");
    }

    /// Hit counts of the library LRU and the `lru` crate on the same sequential
    /// trace, if both ran.
    pub fn reference_lru_hits(&self) -> Option<(usize, usize)> {
        let ours = self.get(SimulationKey::new(CacheAlgorithm::Lru, CacheMode::Sequential))?;
        let reference = self.get(SimulationKey::new(
            CacheAlgorithm::ReferenceLru,
            CacheMode::Sequential,
        ))?;
        Some((ours.hits, reference.hits))
    }

    /// Print whether the library LRU agreed with the reference implementation
    pub fn print_reference_check(&self) {
        match self.reference_lru_hits() {
            Some((ours, reference)) if ours == reference => {
                println!("\nReference check: LRU matches the lru crate ({ours} hits)");
            }
            Some((ours, reference)) => {
                println!(
                    "\nReference check: MISMATCH, LRU had {ours} hits, the lru crate {reference}"
                );
            }
            None => {}
        }
    }

    /// Export results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for key in self.sorted_keys() {
            if let Some(stats) = self.stats.get(&key) {
                writer.serialize(CsvResultRow::new(key, stats))?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn key(algorithm: CacheAlgorithm) -> SimulationKey {
        SimulationKey::new(algorithm, CacheMode::Sequential)
    }

    #[test]
    fn test_records_only_planned_runs() {
        let mut stats = SimulationStats::new(&[key(CacheAlgorithm::Lru)]);
        stats.record_counts(key(CacheAlgorithm::Lru), 3, 1, 0);
        stats.record_counts(key(CacheAlgorithm::Fifo), 9, 9, 9);

        assert_eq!(stats.get(key(CacheAlgorithm::Lru)).map(|s| s.hits), Some(3));
        assert!(stats.get(key(CacheAlgorithm::Fifo)).is_none());

        let result = stats.result(Duration::from_millis(5), 2);
        assert_eq!(result.total_requests, 4);
        assert_eq!(result.unique_objects, 2);
    }

    #[test]
    fn test_reference_lru_hits() {
        let mut stats =
            SimulationStats::new(&[key(CacheAlgorithm::Lru), key(CacheAlgorithm::ReferenceLru)]);
        stats.record_counts(key(CacheAlgorithm::Lru), 7, 3, 1);
        stats.record_counts(key(CacheAlgorithm::ReferenceLru), 7, 3, 1);
        assert_eq!(stats.reference_lru_hits(), Some((7, 7)));

        let only_ours = SimulationStats::new(&[key(CacheAlgorithm::Lru)]);
        assert_eq!(only_ours.reference_lru_hits(), None);
    }

    #[test]
    fn test_export_csv() {
        let mut stats = SimulationStats::new(&[key(CacheAlgorithm::Fifo), key(CacheAlgorithm::Lru)]);
        stats.record_counts(key(CacheAlgorithm::Lru), 1, 1, 0);

        let path = std::env::temp_dir().join("policy_cache_stats_test.csv");
        stats.export_csv(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("algorithm,mode,hits,misses,hit_rate,evictions"));
        assert!(!lines[0].contains("byte"));
        assert!(lines[1].starts_with("LRU,Sequential,1,1,50"));
        assert!(lines[2].starts_with("FIFO,Sequential,0,0,0"));

        let _ = fs::remove_file(&path);
    }
}
