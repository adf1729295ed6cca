//! Thread-safe Policy Cache
//!
//! [`ConcurrentPolicyCache`] wraps a [`PolicyCache`] in a single
//! `parking_lot::Mutex`. Every public method takes the lock once, does all of
//! its work against the store and the tracker, and releases it before
//! returning, so calls from different threads are linearizable and the store
//! and tracker can never be observed out of step.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            ConcurrentPolicyCache            │
//! │                                             │
//! │   ┌─────────────────────────────────────┐   │
//! │   │               Mutex                 │   │
//! │   │  ┌───────────────────────────────┐  │   │
//! │   │  │          PolicyCache          │  │   │
//! │   │  │   ValueStore  +  Tracker      │  │   │
//! │   │  └───────────────────────────────┘  │   │
//! │   └─────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Why Mutex Instead of RwLock?
//!
//! Under LRU and LFU a `get` reorders the tracker, so every lookup is a write.
//! A reader-writer lock would hand out the exclusive side on every call anyway.
//!
//! ## Ordering Is Global
//!
//! There is one lock and one tracker, so eviction order is exact across all
//! keys. Throughput under heavy contention is bounded by that lock.
//!
//! # Example
//!
//! ```
//! use policy_cache::{ConcurrentPolicyCache, EvictionPolicy};
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentPolicyCache::new(
//!     NonZeroUsize::new(1_000).unwrap(),
//!     EvictionPolicy::Lru,
//! ));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 let key = format!("key_{}_{}", t, i);
//!                 cache.put(key.clone(), i);
//!                 let _ = cache.get(&key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 400);
//! ```

extern crate alloc;

use crate::cache::PolicyCache;
use crate::config::PolicyCacheConfig;
use crate::error::{CacheError, InvariantError};
use crate::metrics::CacheMetrics;
use crate::policy::EvictionPolicy;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A [`PolicyCache`] behind one lock, safe to share through `Arc`.
pub struct ConcurrentPolicyCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<PolicyCache<K, V, S>>,
}

impl<K: Hash + Eq + Clone, V> ConcurrentPolicyCache<K, V, DefaultHashBuilder> {
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize, policy: EvictionPolicy) -> Self {
        Self::from_cache(PolicyCache::new(capacity, policy))
    }

    /// Creates a cache from an unchecked capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity` is zero.
    pub fn try_new(capacity: usize, policy: EvictionPolicy) -> Result<Self, CacheError> {
        PolicyCache::try_new(capacity, policy).map(Self::from_cache)
    }

    /// Creates a cache from a configuration.
    ///
    /// `hasher` defaults to a fresh [`DefaultHashBuilder`] when `None`.
    ///
    /// ```
    /// use policy_cache::{ConcurrentPolicyCache, EvictionPolicy, PolicyCacheConfig};
    ///
    /// let config = PolicyCacheConfig::try_new(16, EvictionPolicy::Lru).unwrap();
    /// let cache = ConcurrentPolicyCache::init(config, None);
    /// cache.put(1u32, "one");
    /// assert_eq!(cache.get(&1), Some("one"));
    /// ```
    pub fn init(config: PolicyCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::from_cache(PolicyCache::init(config, hasher))
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> ConcurrentPolicyCache<K, V, S> {
    /// Creates a cache from a configuration with a custom hash builder.
    pub fn init_with_hasher(config: PolicyCacheConfig, hash_builder: S) -> Self {
        Self::from_cache(PolicyCache::init_with_hasher(config, hash_builder))
    }

    /// Wraps an existing single-threaded cache.
    pub fn from_cache(cache: PolicyCache<K, V, S>) -> Self {
        ConcurrentPolicyCache {
            inner: Mutex::new(cache),
        }
    }

    /// Consumes the wrapper and returns the cache inside.
    pub fn into_inner(self) -> PolicyCache<K, V, S> {
        self.inner.into_inner()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.lock().cap()
    }

    /// The eviction policy chosen at construction.
    pub fn policy(&self) -> EvictionPolicy {
        self.inner.lock().policy()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns `true` if `key` is cached. Does not touch eviction order.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().contains(key)
    }

    /// Looks up `key` and returns a clone of its value.
    ///
    /// Counts as an access under LRU and LFU. Use
    /// [`get_with`](Self::get_with) to avoid the clone.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Runs `f` on the value for `key` while the lock is held.
    ///
    /// `f` must not call back into this cache.
    ///
    /// ```
    /// use policy_cache::{ConcurrentPolicyCache, EvictionPolicy};
    /// use core::num::NonZeroUsize;
    ///
    /// let cache = ConcurrentPolicyCache::new(NonZeroUsize::new(4).unwrap(), EvictionPolicy::Lfu);
    /// cache.put("blob", vec![0u8; 1024]);
    /// assert_eq!(cache.get_with(&"blob", |v| v.len()), Some(1024));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Runs `f` on a mutable reference to the value for `key` while the lock is held.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.inner.lock().get_mut(key).map(f)
    }

    /// Returns a clone of the value for `key` without touching eviction order.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Inserts or updates `key`. See [`PolicyCache::put`] for the return value.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.inner.lock().put(key, value)
    }

    /// Removes `key`. Returns whether it was present.
    pub fn erase<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().erase(key)
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().remove(key)
    }

    /// Evicts the current victim and returns it.
    pub fn pop(&self) -> Option<(K, V)> {
        self.inner.lock().pop()
    }

    /// Drops every entry and resets the eviction order.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Access count of `key`. `None` unless the policy is LFU.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().frequency(key)
    }

    /// Runs [`PolicyCache::check_invariants`] under the lock.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<K, V, S> CacheMetrics for ConcurrentPolicyCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.inner.lock().algorithm_name()
    }
}

impl<K, V, S> fmt::Debug for ConcurrentPolicyCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(cache) => f
                .debug_struct("ConcurrentPolicyCache")
                .field("inner", &*cache)
                .finish(),
            None => f
                .debug_struct("ConcurrentPolicyCache")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    fn make(cap: usize, policy: EvictionPolicy) -> ConcurrentPolicyCache<u64, u64> {
        ConcurrentPolicyCache::new(NonZeroUsize::new(cap).unwrap(), policy)
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_is_send_and_sync() {
        assert_send_sync::<ConcurrentPolicyCache<u64, u64>>();
    }

    #[test]
    fn test_basic_operations() {
        let cache = make(2, EvictionPolicy::Lru);
        assert!(cache.is_empty());
        assert_eq!(cache.put(1, 10), None);
        assert_eq!(cache.put(2, 20), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.put(3, 30), Some((2, 20)));
        assert!(cache.erase(&1));
        assert!(!cache.erase(&1));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity().get(), 2);
        assert_eq!(cache.policy(), EvictionPolicy::Lru);
    }

    #[test]
    fn test_get_mut_with() {
        let cache = make(2, EvictionPolicy::Fifo);
        cache.put(1, 1);
        let scaled = cache.get_mut_with(&1, |v| {
            *v *= 7;
            *v
        });
        assert_eq!(scaled, Some(7));
        assert_eq!(cache.peek(&1), Some(7));
        assert_eq!(cache.get_mut_with(&2, |v| *v), None);
    }

    #[test]
    fn test_init_and_debug() {
        let config = PolicyCacheConfig::try_new(3, EvictionPolicy::Lfu).unwrap();
        let cache = ConcurrentPolicyCache::init(config, None);
        cache.put(1u64, 10u64);
        let rendered = format!("{cache:?}");
        assert!(rendered.starts_with("ConcurrentPolicyCache"));
        assert!(rendered.contains("len: 1"));

        let cache = cache.into_inner();
        assert_eq!(cache.peek(&1), Some(&10));
    }

    #[test]
    fn test_init_with_hasher() {
        let config = PolicyCacheConfig::try_new(2, EvictionPolicy::Fifo).unwrap();
        let cache: ConcurrentPolicyCache<u64, u64, DefaultHashBuilder> =
            ConcurrentPolicyCache::init_with_hasher(config, DefaultHashBuilder::default());
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.put(3, 3), Some((1, 1)));
        assert_eq!(cache.check_invariants(), Ok(()));
    }

    #[test]
    fn test_try_new_zero() {
        assert!(matches!(
            ConcurrentPolicyCache::<u64, u64>::try_new(0, EvictionPolicy::Lfu),
            Err(CacheError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_threads_respect_capacity() {
        for policy in EvictionPolicy::ALL {
            let cache = Arc::new(make(50, policy));
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..500u64 {
                            let key = (t * 1_000 + i) % 120;
                            cache.put(key, i);
                            let _ = cache.get(&key);
                            if i % 7 == 0 {
                                cache.erase(&key);
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert!(cache.len() <= 50);
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_metrics_through_lock() {
        let cache = make(4, EvictionPolicy::Lfu);
        cache.put(1, 1);
        cache.get(&1);
        cache.get(&2);
        assert_eq!(cache.frequency(&1), Some(2));
        let m = cache.metrics();
        assert_eq!(m.get("requests"), Some(&2.0));
        assert_eq!(cache.algorithm_name(), "LFU");
    }
}
