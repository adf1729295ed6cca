//! Recency tracker for the LRU policy.
//!
//! Keys sit in an arena list ordered most recently used (front) to least
//! recently used (back). A side index maps each key to its node so that an
//! access can relocate the key in O(1).

extern crate alloc;

use super::{AccessTracker, EvictionTracker};
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

/// Tracks keys in recency order and evicts the least recently used one.
pub struct LruTracker<K, S = DefaultHashBuilder> {
    order: List<K>,
    index: HashMap<K, NodeId, S>,
}

impl<K: Hash + Eq + Clone> LruTracker<K, DefaultHashBuilder> {
    /// Creates a tracker pre-sized for `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> LruTracker<K, S> {
    /// Creates a tracker pre-sized for `capacity` keys using `hash_builder`.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        LruTracker {
            order: List::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.order.len() != self.index.len() {
            return Err(InvariantError::new("LRU order and index differ in length"));
        }
        for key in self.order.iter() {
            let id = self
                .index
                .get(key)
                .copied()
                .ok_or_else(|| InvariantError::new("LRU key missing from index"))?;
            if self.order.get(id) != Some(key) {
                return Err(InvariantError::new("LRU index points at the wrong node"));
            }
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> EvictionTracker<K> for LruTracker<K, S> {
    fn record_insertion(&mut self, key: K) {
        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_front(id);
            return;
        }
        let id = self.order.push_front(key.clone());
        self.index.insert(key, id);
    }

    fn evict_victim(&mut self) -> Option<K> {
        let key = self.order.pop_back()?;
        self.index.remove(&key);
        Some(key)
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.index.remove(key) {
            Some(id) => {
                self.order.remove(id);
                true
            }
            None => false,
        }
    }

    fn peek_victim(&self) -> Option<&K> {
        self.order.back()
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
        self.order.clear();
        self.index.clear();
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> AccessTracker<K> for LruTracker<K, S> {
    fn record_access<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(&id) = self.index.get(key) {
            self.order.move_to_front(id);
        }
    }
}

impl<K: fmt::Debug, S> fmt::Debug for LruTracker<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruTracker")
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn keys(t: &LruTracker<i32>) -> Vec<i32> {
        t.iter().copied().collect()
    }

    #[test]
    fn test_evicts_least_recent() {
        let mut t = LruTracker::new(3);
        t.record_insertion(1);
        t.record_insertion(2);
        t.record_insertion(3);
        t.record_access(&1);
        assert_eq!(keys(&t), vec![1, 3, 2]);
        assert_eq!(t.evict_victim(), Some(2));
        assert_eq!(t.evict_victim(), Some(3));
        assert_eq!(t.evict_victim(), Some(1));
        assert_eq!(t.evict_victim(), None);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_untracked_key_is_noop() {
        let mut t = LruTracker::new(2);
        t.record_insertion(1);
        t.record_access(&9);
        assert!(!t.remove(&9));
        assert_eq!(keys(&t), vec![1]);
    }

    #[test]
    fn test_reinsert_does_not_duplicate() {
        let mut t = LruTracker::new(2);
        t.record_insertion(1);
        t.record_insertion(2);
        t.record_insertion(1);
        assert_eq!(t.len(), 2);
        assert_eq!(keys(&t), vec![1, 2]);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_arbitrary() {
        let mut t = LruTracker::new(3);
        for k in 1..=3 {
            t.record_insertion(k);
        }
        assert!(t.remove(&2));
        assert_eq!(keys(&t), vec![3, 1]);
        assert_eq!(t.peek_victim(), Some(&1));
        t.check_invariants().unwrap();
    }
}
