//! Eviction policies and the trackers that implement them.
//!
//! A tracker records *order* only. It never sees cached values; it knows
//! which keys are present and which one should leave next. The cache
//! controller pairs exactly one tracker with a [`ValueStore`](crate::store::ValueStore)
//! and keeps the two in lock-step.
//!
//! | Policy | Tracker | Victim | Reacts to access |
//! |--------|---------|--------|------------------|
//! | [`EvictionPolicy::Lru`] | [`LruTracker`] | least recently used | yes |
//! | [`EvictionPolicy::Fifo`] | [`FifoTracker`] | oldest insertion | no |
//! | [`EvictionPolicy::Lfu`] | [`LfuTracker`] | lowest frequency, then least recent | yes |
//!
//! Two capability traits describe what a tracker can do. Every tracker is an
//! [`EvictionTracker`]; only trackers whose order depends on reads also
//! implement [`AccessTracker`]. [`Tracker`] is the closed set the controller
//! actually holds, chosen once at construction and dispatched by `match`.

extern crate alloc;

use crate::error::InvariantError;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Insertion-order tracker.
pub mod fifo;
/// Frequency-bucket tracker.
pub mod lfu;
/// Recency tracker.
pub mod lru;

pub use fifo::FifoTracker;
pub use lfu::LfuTracker;
pub use lru::LruTracker;

/// Rule used to pick the entry that leaves when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvictionPolicy {
    /// Evict the entry whose last access is oldest.
    #[default]
    Lru,
    /// Evict the entry that was inserted first. Reads and updates do not reorder.
    Fifo,
    /// Evict the entry with the fewest accesses; ties go to the least recently touched.
    Lfu,
}

impl EvictionPolicy {
    /// Every policy, in a fixed order.
    pub const ALL: [EvictionPolicy; 3] = [
        EvictionPolicy::Lru,
        EvictionPolicy::Fifo,
        EvictionPolicy::Lfu,
    ];

    /// Short upper-case name, e.g. `"LRU"`.
    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "LRU",
            EvictionPolicy::Fifo => "FIFO",
            EvictionPolicy::Lfu => "LFU",
        }
    }

    /// Whether reads and updates change this policy's eviction order.
    pub fn tracks_access(self) -> bool {
        !matches!(self, EvictionPolicy::Fifo)
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ordering bookkeeping shared by every policy.
pub trait EvictionTracker<K> {
    /// Starts tracking `key`.
    ///
    /// Inserting a key that is already tracked never creates a duplicate.
    fn record_insertion(&mut self, key: K);

    /// Removes and returns the key this policy would evict next.
    fn evict_victim(&mut self) -> Option<K>;

    /// Stops tracking `key`. Returns `false` if it was not tracked.
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// The key [`evict_victim`](Self::evict_victim) would return, without removing it.
    fn peek_victim(&self) -> Option<&K>;

    /// Returns `true` if `key` is tracked.
    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    /// Returns `true` if no key is tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every tracked key.
    fn clear(&mut self);
}

/// Trackers whose eviction order reacts to reads and updates.
pub trait AccessTracker<K>: EvictionTracker<K> {
    /// Notes a hit on `key`. Untracked keys are ignored.
    fn record_access<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;
}

/// The tracker owned by a cache, one variant per [`EvictionPolicy`].
pub enum Tracker<K, S = DefaultHashBuilder> {
    /// Recency order.
    Lru(LruTracker<K, S>),
    /// Insertion order.
    Fifo(FifoTracker<K, S>),
    /// Frequency buckets, recency within a bucket.
    Lfu(LfuTracker<K, S>),
}

impl<K: Hash + Eq + Clone, S: BuildHasher> Tracker<K, S> {
    /// Creates the tracker for `policy`, pre-sized for `capacity` keys.
    pub fn new(policy: EvictionPolicy, capacity: usize, hash_builder: S) -> Self {
        match policy {
            EvictionPolicy::Lru => Tracker::Lru(LruTracker::with_hasher(capacity, hash_builder)),
            EvictionPolicy::Fifo => {
                Tracker::Fifo(FifoTracker::with_hasher(capacity, hash_builder))
            }
            EvictionPolicy::Lfu => Tracker::Lfu(LfuTracker::with_hasher(capacity, hash_builder)),
        }
    }

    /// The policy this tracker implements.
    pub fn policy(&self) -> EvictionPolicy {
        match self {
            Tracker::Lru(_) => EvictionPolicy::Lru,
            Tracker::Fifo(_) => EvictionPolicy::Fifo,
            Tracker::Lfu(_) => EvictionPolicy::Lfu,
        }
    }

    /// Forwards a hit to trackers that care about access. FIFO ignores it.
    pub fn record_access<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self {
            Tracker::Lru(t) => t.record_access(key),
            Tracker::Fifo(_) => {}
            Tracker::Lfu(t) => t.record_access(key),
        }
    }

    /// Access count of `key`. Only the LFU tracker counts.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self {
            Tracker::Lfu(t) => t.frequency(key),
            _ => None,
        }
    }

    /// Lowest frequency currently tracked (LFU only).
    pub fn min_frequency(&self) -> Option<u64> {
        match self {
            Tracker::Lfu(t) => t.min_frequency(),
            _ => None,
        }
    }

    /// Highest frequency currently tracked (LFU only).
    pub fn max_frequency(&self) -> Option<u64> {
        match self {
            Tracker::Lfu(t) => t.max_frequency(),
            _ => None,
        }
    }

    /// Number of live frequency buckets; zero for non-LFU trackers.
    pub fn bucket_count(&self) -> usize {
        match self {
            Tracker::Lfu(t) => t.bucket_count(),
            _ => 0,
        }
    }

    /// Checks that the tracker's order list and key index agree.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match self {
            Tracker::Lru(t) => t.check_invariants(),
            Tracker::Fifo(t) => t.check_invariants(),
            Tracker::Lfu(t) => t.check_invariants(),
        }
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> EvictionTracker<K> for Tracker<K, S> {
    fn record_insertion(&mut self, key: K) {
        match self {
            Tracker::Lru(t) => t.record_insertion(key),
            Tracker::Fifo(t) => t.record_insertion(key),
            Tracker::Lfu(t) => t.record_insertion(key),
        }
    }

    fn evict_victim(&mut self) -> Option<K> {
        match self {
            Tracker::Lru(t) => t.evict_victim(),
            Tracker::Fifo(t) => t.evict_victim(),
            Tracker::Lfu(t) => t.evict_victim(),
        }
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self {
            Tracker::Lru(t) => t.remove(key),
            Tracker::Fifo(t) => t.remove(key),
            Tracker::Lfu(t) => t.remove(key),
        }
    }

    fn peek_victim(&self) -> Option<&K> {
        match self {
            Tracker::Lru(t) => t.peek_victim(),
            Tracker::Fifo(t) => t.peek_victim(),
            Tracker::Lfu(t) => t.peek_victim(),
        }
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self {
            Tracker::Lru(t) => t.contains(key),
            Tracker::Fifo(t) => t.contains(key),
            Tracker::Lfu(t) => t.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Tracker::Lru(t) => t.len(),
            Tracker::Fifo(t) => t.len(),
            Tracker::Lfu(t) => t.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Tracker::Lru(t) => t.clear(),
            Tracker::Fifo(t) => t.clear(),
            Tracker::Lfu(t) => t.clear(),
        }
    }
}

impl<K, S> fmt::Debug for Tracker<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tracker::Lru(_) => "Lru",
            Tracker::Fifo(_) => "Fifo",
            Tracker::Lfu(_) => "Lfu",
        };
        f.debug_tuple("Tracker").field(&name).finish()
    }
}
