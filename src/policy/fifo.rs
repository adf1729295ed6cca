//! Insertion-order tracker for the FIFO policy.
//!
//! Keys are appended at the back and evicted from the front. The tracker
//! deliberately has no access hook, so reads and value updates cannot
//! reorder it. Removal of an arbitrary key goes through the node index and
//! is O(1).

extern crate alloc;

use super::EvictionTracker;
use crate::error::InvariantError;
use crate::list::{List, NodeId};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Tracks keys in insertion order and evicts the oldest one.
pub struct FifoTracker<K, S = DefaultHashBuilder> {
    queue: List<K>,
    index: HashMap<K, NodeId, S>,
}

impl<K: Hash + Eq + Clone> FifoTracker<K, DefaultHashBuilder> {
    /// Creates a tracker pre-sized for `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> FifoTracker<K, S> {
    /// Creates a tracker pre-sized for `capacity` keys using `hash_builder`.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        FifoTracker {
            queue: List::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.queue.iter()
    }

    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.queue.len() != self.index.len() {
            return Err(InvariantError::new("FIFO queue and index differ in length"));
        }
        for key in self.queue.iter() {
            let id = self.index.get(key).copied();
            if id.and_then(|id| self.queue.get(id)) != Some(key) {
                return Err(InvariantError::new("FIFO key not indexed at its own node"));
            }
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> EvictionTracker<K> for FifoTracker<K, S> {
    /// Appends `key`. A key that is already queued keeps its original place.
    fn record_insertion(&mut self, key: K) {
        if self.index.contains_key(&key) {
            return;
        }
        let id = self.queue.push_back(key.clone());
        self.index.insert(key, id);
    }

    fn evict_victim(&mut self) -> Option<K> {
        let key = self.queue.pop_front()?;
        self.index.remove(&key);
        Some(key)
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        self.queue.remove(id);
        true
    }

    fn peek_victim(&self) -> Option<&K> {
        self.queue.front()
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
    }
}

impl<K: fmt::Debug, S> fmt::Debug for FifoTracker<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoTracker")
            .field("queue", &self.queue)
            .finish()
    }
}
