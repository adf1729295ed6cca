//! Frequency metrics, maintained by caches running the LFU policy.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Snapshot of the access-frequency distribution.
#[derive(Debug, Default, Clone)]
pub struct FrequencyMetrics {
    /// Lowest frequency currently held, 0 when empty
    pub min_frequency: u64,

    /// Highest frequency currently held, 0 when empty
    pub max_frequency: u64,

    /// Number of times any key moved up a frequency level
    pub total_frequency_increments: u64,

    /// Number of distinct frequencies currently in use
    pub active_frequency_levels: u64,
}

impl FrequencyMetrics {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one promotion.
    pub fn record_frequency_increment(&mut self) {
        self.total_frequency_increments += 1;
    }

    /// Refreshes the distribution bounds from the tracker's current state.
    pub fn update_frequency_levels(&mut self, min: Option<u64>, max: Option<u64>, levels: usize) {
        self.min_frequency = min.unwrap_or(0);
        self.max_frequency = max.unwrap_or(0);
        self.active_frequency_levels = levels as u64;
    }

    /// Spread between the highest and lowest live frequency.
    pub fn frequency_range(&self) -> u64 {
        self.max_frequency.saturating_sub(self.min_frequency)
    }

    /// Adds the frequency entries to `metrics`. `cache_hits` feeds the average.
    pub fn extend_btreemap(&self, metrics: &mut BTreeMap<String, f64>, cache_hits: u64) {
        metrics.insert("min_frequency".to_string(), self.min_frequency as f64);
        metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
        metrics.insert("frequency_range".to_string(), self.frequency_range() as f64);
        metrics.insert(
            "total_frequency_increments".to_string(),
            self.total_frequency_increments as f64,
        );
        metrics.insert(
            "active_frequency_levels".to_string(),
            self.active_frequency_levels as f64,
        );
        let average = if cache_hits > 0 {
            self.total_frequency_increments as f64 / cache_hits as f64
        } else {
            0.0
        };
        metrics.insert("average_frequency_increment".to_string(), average);
    }
}
