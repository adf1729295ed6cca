//! Metrics carried by a [`PolicyCache`](crate::PolicyCache).

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics, FrequencyMetrics};
use crate::policy::EvictionPolicy;
use alloc::collections::BTreeMap;
use alloc::string::String;

/// Core counters plus, under LFU, the frequency distribution.
#[derive(Debug, Clone)]
pub struct PolicyCacheMetrics {
    /// Counters common to every policy
    pub core: CoreCacheMetrics,

    /// Present only when the cache runs [`EvictionPolicy::Lfu`]
    pub frequency: Option<FrequencyMetrics>,

    policy: EvictionPolicy,
}

impl PolicyCacheMetrics {
    /// Creates counters for a cache of `capacity` entries under `policy`.
    pub fn new(policy: EvictionPolicy, capacity: u64) -> Self {
        let frequency = match policy {
            EvictionPolicy::Lfu => Some(FrequencyMetrics::new()),
            EvictionPolicy::Lru | EvictionPolicy::Fifo => None,
        };
        Self {
            core: CoreCacheMetrics::new(capacity),
            frequency,
            policy,
        }
    }

    /// The policy these metrics describe.
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Flattens every counter into a name to value map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        if let Some(frequency) = &self.frequency {
            frequency.extend_btreemap(&mut metrics, self.core.cache_hits);
        }
        metrics
    }
}

impl CacheMetrics for PolicyCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.policy.as_str()
    }
}
