//! Policy-driven Cache Controller
//!
//! [`PolicyCache`] pairs a [`ValueStore`] holding the data with a [`Tracker`]
//! holding the eviction order, and keeps the two describing exactly the same
//! key set after every call. The eviction policy is chosen once at
//! construction and never changes.
//!
//! # Algorithm
//!
//! ```text
//!   put(k, v)
//!     ├─ k present ─► overwrite value ─► LRU/LFU: record access
//!     └─ k absent
//!          ├─ full? ─► tracker.evict_victim() ─► store.remove(victim)
//!          └─ store.set(k, v) ─► tracker.record_insertion(k)
//!
//!   get(k)
//!     ├─ k absent  ─► None
//!     └─ k present ─► LRU/LFU: record access ─► Some(&v)
//! ```
//!
//! FIFO order is fixed at insertion time: neither reads nor value updates
//! move a key.
//!
//! # Performance Characteristics
//!
//! | Operation | LRU | FIFO | LFU |
//! |-----------|-----|------|-----|
//! | `get`     | O(1)| O(1) | O(1)|
//! | `put`     | O(1)| O(1) | O(1)|
//! | `erase`   | O(1)| O(1) | O(1)|
//! | `clear`   | O(n)| O(n) | O(n)|
//!
//! # Thread Safety
//!
//! `PolicyCache` is not thread-safe. Use
//! [`ConcurrentPolicyCache`](crate::ConcurrentPolicyCache) (feature
//! `concurrent`) to share a cache between threads.
//!
//! # Examples
//!
//! ```
//! use policy_cache::{EvictionPolicy, PolicyCache};
//! use core::num::NonZeroUsize;
//!
//! let mut cache = PolicyCache::new(NonZeroUsize::new(2).unwrap(), EvictionPolicy::Lru);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3);
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.get(&"a"), Some(&1));
//! ```

extern crate alloc;

use crate::config::PolicyCacheConfig;
use crate::error::{CacheError, InvariantError};
use crate::metrics::{CacheMetrics, PolicyCacheMetrics};
use crate::policy::{EvictionPolicy, EvictionTracker, Tracker};
use crate::store::ValueStore;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A bounded cache whose eviction order is decided by an [`EvictionPolicy`].
pub struct PolicyCache<K, V, S = DefaultHashBuilder> {
    config: PolicyCacheConfig,
    store: ValueStore<K, V, S>,
    tracker: Tracker<K, S>,
    metrics: PolicyCacheMetrics,
}

impl<K: Hash + Eq + Clone, V> PolicyCache<K, V, DefaultHashBuilder> {
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize, policy: EvictionPolicy) -> Self {
        Self::with_hasher(capacity, policy, DefaultHashBuilder::default())
    }

    /// Creates a cache from an unchecked capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_cache::{CacheError, EvictionPolicy, PolicyCache};
    ///
    /// let err = PolicyCache::<u32, u32>::try_new(0, EvictionPolicy::Fifo).unwrap_err();
    /// assert_eq!(err, CacheError::ZeroCapacity);
    /// ```
    pub fn try_new(capacity: usize, policy: EvictionPolicy) -> Result<Self, CacheError> {
        let config = PolicyCacheConfig::try_new(capacity, policy)?;
        Ok(Self::init(config, None))
    }

    /// Creates a cache from a configuration.
    ///
    /// `hasher` defaults to a fresh [`DefaultHashBuilder`] when `None`. Use
    /// [`init_with_hasher`](PolicyCache::init_with_hasher) for any other
    /// hasher type.
    ///
    /// ```
    /// use policy_cache::{EvictionPolicy, PolicyCache, PolicyCacheConfig};
    ///
    /// let config = PolicyCacheConfig::try_new(2, EvictionPolicy::Fifo).unwrap();
    /// let mut cache = PolicyCache::init(config, None);
    /// cache.put("a", 1);
    /// assert_eq!(cache.peek(&"a"), Some(&1));
    /// ```
    pub fn init(config: PolicyCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> PolicyCache<K, V, S> {
    /// Creates a cache from a configuration with a custom hash builder.
    ///
    /// Use this for deterministic hashing or DoS-resistant hashers.
    pub fn init_with_hasher(config: PolicyCacheConfig, hash_builder: S) -> Self {
        let capacity = config.capacity.get();
        PolicyCache {
            config,
            store: ValueStore::with_capacity_and_hasher(capacity, hash_builder.clone()),
            tracker: Tracker::new(config.policy, capacity, hash_builder),
            metrics: PolicyCacheMetrics::new(config.policy, capacity as u64),
        }
    }

    /// Creates a cache with a custom hash builder.
    pub fn with_hasher(capacity: NonZeroUsize, policy: EvictionPolicy, hash_builder: S) -> Self {
        Self::init_with_hasher(PolicyCacheConfig { capacity, policy }, hash_builder)
    }

    /// Maximum number of entries.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    /// The eviction policy chosen at construction.
    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.config.policy
    }

    /// Number of entries currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns `true` if `key` is cached. Does not touch eviction order.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.contains_key(key)
    }

    /// Returns the value for `key` without touching eviction order or metrics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.get(key)
    }

    /// The key that would be evicted next.
    pub fn peek_victim(&self) -> Option<&K> {
        self.tracker.peek_victim()
    }

    /// Looks up `key`, counting the hit as an access under LRU and LFU.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.store.contains_key(key) {
            self.metrics.core.record_miss();
            return None;
        }
        self.touch(key);
        self.metrics.core.record_hit();
        self.store.get(key)
    }

    /// Mutable lookup. Counts as an access exactly like [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.store.contains_key(key) {
            self.metrics.core.record_miss();
            return None;
        }
        self.touch(key);
        self.metrics.core.record_hit();
        self.store.get_mut(key)
    }

    /// Inserts or updates `key`.
    ///
    /// Returns the displaced entry:
    /// - on update, `Some((key, old_value))`
    /// - on insertion into a full cache, `Some((victim_key, victim_value))`
    /// - otherwise `None`
    ///
    /// Updating a present key never evicts. Under FIFO an update leaves the
    /// key's queue position unchanged.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.store.get_mut(&key) {
            let old = mem::replace(slot, value);
            self.touch(&key);
            self.metrics.core.record_update();
            return Some((key, old));
        }

        let evicted = if self.store.len() >= self.config.capacity.get() {
            self.evict()
        } else {
            None
        };

        self.store.set(key.clone(), value);
        self.tracker.record_insertion(key);
        self.metrics.core.record_insertion();
        self.refresh_frequency_levels();
        evicted
    }

    /// Removes `key`. Returns whether it was present.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let value = self.store.remove(key)?;
        let tracked = self.tracker.remove(key);
        debug_assert!(tracked, "stored key was not tracked");
        self.metrics.core.record_removal();
        self.refresh_frequency_levels();
        Some(value)
    }

    /// Evicts the current victim and returns it.
    pub fn pop(&mut self) -> Option<(K, V)> {
        let evicted = self.evict();
        self.refresh_frequency_levels();
        evicted
    }

    /// Drops every entry and resets the eviction order.
    pub fn clear(&mut self) {
        self.store.clear();
        self.tracker.clear();
        self.metrics.core.record_clear();
        self.refresh_frequency_levels();
    }

    /// Access count of `key`. `None` unless the policy is LFU.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.tracker.frequency(key)
    }

    /// Live counters for this cache.
    pub fn metrics_snapshot(&self) -> &PolicyCacheMetrics {
        &self.metrics
    }

    /// Checks that the store and tracker describe the same key set within
    /// capacity, and that the tracker is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.store.len() > self.config.capacity.get() {
            return Err(InvariantError::new("cache holds more entries than its capacity"));
        }
        if self.store.len() != self.tracker.len() {
            return Err(InvariantError::new("store and tracker differ in length"));
        }
        if self.store.keys().any(|key| !self.tracker.contains(key)) {
            return Err(InvariantError::new("stored key is not tracked"));
        }
        self.tracker.check_invariants()
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let victim = self.tracker.evict_victim()?;
        let value = self.store.remove(&victim);
        debug_assert!(value.is_some(), "evicted key was not stored");
        let value = value?;
        self.metrics.core.record_eviction();
        Some((victim, value))
    }

    fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.config.policy.tracks_access() {
            return;
        }
        let before = self.tracker.frequency(key);
        self.tracker.record_access(key);
        if let Some(frequency) = self.metrics.frequency.as_mut() {
            if self.tracker.frequency(key) != before {
                frequency.record_frequency_increment();
            }
        }
        self.refresh_frequency_levels();
    }

    fn refresh_frequency_levels(&mut self) {
        if let Some(frequency) = self.metrics.frequency.as_mut() {
            frequency.update_frequency_levels(
                self.tracker.min_frequency(),
                self.tracker.max_frequency(),
                self.tracker.bucket_count(),
            );
        }
    }
}

impl<K, V, S> CacheMetrics for PolicyCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.config.policy.as_str()
    }
}

impl<K, V, S> fmt::Debug for PolicyCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyCache")
            .field("capacity", &self.config.capacity)
            .field("policy", &self.config.policy)
            .field("len", &self.store.len())
            .finish()
    }
}
