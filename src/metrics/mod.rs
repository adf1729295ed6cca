//! Cache Metrics System
//!
//! Every cache keeps a set of plain counters that can be exported as a
//! `BTreeMap<String, f64>` through the [`CacheMetrics`] trait. A `BTreeMap` is
//! used so that keys always come out in the same order, which keeps simulator
//! output and test snapshots reproducible.
//!
//! - [`CoreCacheMetrics`]: counters shared by every policy
//! - [`FrequencyMetrics`]: frequency distribution, maintained only under LFU
//! - [`PolicyCacheMetrics`]: what a [`PolicyCache`](crate::PolicyCache) actually carries

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// LFU frequency distribution.
pub mod frequency;
/// Per-cache metrics bundle.
pub mod policy;

pub use frequency::FrequencyMetrics;
pub use policy::PolicyCacheMetrics;

/// Common metrics tracked by every cache regardless of policy.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of lookups made through `get`/`get_mut`
    pub requests: u64,

    /// Lookups that found their key
    pub cache_hits: u64,

    /// New keys written to the cache
    pub insertions: u64,

    /// Writes that replaced the value of a key already present
    pub updates: u64,

    /// Entries pushed out by the eviction policy
    pub evictions: u64,

    /// Entries deleted explicitly by the caller
    pub removals: u64,

    /// Number of times the whole cache was cleared
    pub clears: u64,

    /// Entries currently held
    pub entries: u64,

    /// Maximum number of entries
    pub capacity: u64,
}

impl CoreCacheMetrics {
    /// Creates empty counters for a cache holding at most `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Records a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key.
    ///
    /// Misses are not stored separately; they are `requests - cache_hits`.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a new key.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
        self.entries += 1;
    }

    /// Records a value replaced in place.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records an entry pushed out by the policy.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
        self.entries = self.entries.saturating_sub(1);
    }

    /// Records an explicit erase.
    pub fn record_removal(&mut self) {
        self.removals += 1;
        self.entries = self.entries.saturating_sub(1);
    }

    /// Records a full clear.
    pub fn record_clear(&mut self) {
        self.clears += 1;
        self.entries = 0;
    }

    /// Fraction of lookups that hit, between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, between 0.0 and 1.0.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// How full the cache is, between 0.0 and 1.0.
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0 {
            self.entries as f64 / self.capacity as f64
        } else {
            0.0
        }
    }

    /// Converts the counters into a map with deterministic key order.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("capacity".to_string(), self.capacity as f64);
        metrics.insert("clears".to_string(), self.clears as f64);
        metrics.insert("entries".to_string(), self.entries as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());
        metrics.insert("utilization".to_string(), self.utilization());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics export implemented by every cache.
///
/// The simulator relies on this trait to compare policies side by side.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short name of the eviction algorithm, e.g. `"LRU"`.
    fn algorithm_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut m = CoreCacheMetrics::new(4);
        assert_eq!(m.hit_rate(), 0.0);
        m.record_hit();
        m.record_hit();
        m.record_hit();
        m.record_miss();
        assert_eq!(m.requests, 4);
        assert!((m.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert!((m.miss_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entry_accounting() {
        let mut m = CoreCacheMetrics::new(2);
        m.record_insertion();
        m.record_insertion();
        assert!((m.utilization() - 1.0).abs() < f64::EPSILON);
        m.record_eviction();
        m.record_removal();
        assert_eq!(m.entries, 0);
        m.record_removal();
        assert_eq!(m.entries, 0);
        m.record_insertion();
        m.record_clear();
        assert_eq!(m.entries, 0);
        assert_eq!(m.clears, 1);
    }

    #[test]
    fn test_btreemap_keys_are_sorted() {
        let mut m = CoreCacheMetrics::new(8);
        m.record_miss();
        let map = m.to_btreemap();
        assert_eq!(map.get("cache_misses"), Some(&1.0));
        assert!(map.contains_key("eviction_rate"));
        let keys: alloc::vec::Vec<&String> = map.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
