#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Choosing a Policy
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                  Which eviction policy fits?                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  Recently used keys are likely to be used again?  ──Yes──▶  LRU  │
//! │            │                                                     │
//! │           No                                                     │
//! │            ▼                                                     │
//! │  A small set of keys stays popular for a long time? ─Yes─▶  LFU  │
//! │            │                                                     │
//! │           No                                                     │
//! │            ▼                                                     │
//! │  Entries simply age out in arrival order?  ──────Yes──────▶ FIFO │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PolicyCache`] | Single-threaded cache with a fixed [`EvictionPolicy`] |
//! | [`ConcurrentPolicyCache`] | The same cache behind one `parking_lot::Mutex` (feature `concurrent`) |
//! | [`PolicyCacheConfig`] | Capacity and policy, passed to `init` |
//! | [`CacheError`] | Construction failure for a zero capacity |
//!
//! ## Performance Characteristics
//!
//! | Policy | Get | Put | Erase | Victim |
//! |--------|-----|-----|-------|--------|
//! | LRU    | O(1)| O(1)| O(1)  | least recently used |
//! | FIFO   | O(1)| O(1)| O(1)  | oldest insertion |
//! | LFU    | O(1)| O(1)| O(1)  | lowest access count, then least recent |
//!
//! ## Code Examples
//!
//! ### LRU
//!
//! ```rust
//! use policy_cache::{EvictionPolicy, PolicyCache};
//! use policy_cache::config::PolicyCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = PolicyCacheConfig {
//!     capacity: NonZeroUsize::new(3).unwrap(),
//!     policy: EvictionPolicy::Lru,
//! };
//! let mut cache = PolicyCache::init(config, None);
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.put(3, "three");
//! cache.get(&1);          // 1 becomes most recently used
//! cache.put(4, "four");   // 2 evicted
//! assert!(!cache.contains(&2));
//! ```
//!
//! ### FIFO
//!
//! ```rust
//! use policy_cache::{EvictionPolicy, PolicyCache};
//! use core::num::NonZeroUsize;
//!
//! let mut cache = PolicyCache::new(NonZeroUsize::new(3).unwrap(), EvictionPolicy::Fifo);
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.put(3, "three");
//! cache.get(&1);          // reads do not reorder FIFO
//! cache.put(4, "four");   // 1 evicted
//! assert!(!cache.contains(&1));
//! ```
//!
//! ### LFU
//!
//! ```rust
//! use policy_cache::{EvictionPolicy, PolicyCache};
//! use core::num::NonZeroUsize;
//!
//! let mut cache = PolicyCache::new(NonZeroUsize::new(3).unwrap(), EvictionPolicy::Lfu);
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.put(3, "three");
//! cache.get(&1);
//! cache.get(&1);
//! cache.get(&2);
//! cache.put(4, "four");   // 3 evicted: fewest accesses
//! assert!(!cache.contains(&3));
//! assert_eq!(cache.frequency(&1), Some(3));
//! ```
//!
//! ## Concurrent Cache
//!
//! The `concurrent` feature (on by default) adds [`ConcurrentPolicyCache`]:
//!
//! ```rust
//! # #[cfg(feature = "concurrent")]
//! # {
//! use policy_cache::{ConcurrentPolicyCache, EvictionPolicy};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(ConcurrentPolicyCache::try_new(10_000, EvictionPolicy::Lfu).unwrap());
//!
//! let cache_clone = Arc::clone(&cache);
//! std::thread::spawn(move || {
//!     cache_clone.put("key".to_string(), 42);
//! })
//! .join()
//! .unwrap();
//! assert_eq!(cache.get("key"), Some(42));
//! # }
//! ```

#![no_std]

#[cfg(any(feature = "std", not(feature = "hashbrown"), test))]
extern crate std;

extern crate alloc;

/// Arena-backed doubly linked list addressed by stable handles.
///
/// Every ordering structure in the crate is built on it.
pub mod list;

/// Key to value storage with no ordering knowledge.
pub mod store;

/// Eviction policies and their trackers.
pub mod policy;

/// Configuration structures.
pub mod config;

/// Construction errors.
pub mod error;

/// Metrics collection and reporting.
pub mod metrics;

/// The cache controller.
pub mod cache;

/// Thread-safe wrapper, enabled by the `concurrent` feature.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use cache::PolicyCache;
pub use config::PolicyCacheConfig;
pub use error::{CacheError, InvariantError};
pub use policy::{AccessTracker, EvictionPolicy, EvictionTracker, Tracker};

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentPolicyCache;
