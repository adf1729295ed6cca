//! Frequency tracker for the LFU policy.
//!
//! # Layout
//!
//! Keys are grouped into buckets by access count. The buckets form an arena
//! list kept in strictly ascending frequency order, and each bucket holds its
//! own arena list of keys ordered most recently touched (front) to least
//! recently touched (back):
//!
//! ```text
//!   buckets:  [f=1] ──► [f=2] ──► [f=5]
//!              │         │         │
//!              c, d      a         b
//!              ▲   ▲
//!              │   └── victim (lowest frequency, least recent)
//!              └────── newest insertion
//!
//!   index:    a → (bucket f=2, slot)   b → (bucket f=5, slot) ...
//! ```
//!
//! Buckets are created on demand and dropped as soon as they empty, so the
//! front bucket always holds the minimum frequency and the victim is the back
//! key of that bucket. Every operation is O(1).
//!
//! # Promotion
//!
//! An access moves a key from bucket `f` to bucket `f + 1`. Because the list
//! is strictly ascending, the `f + 1` bucket (if it exists) is the immediate
//! successor of `f`; otherwise a fresh bucket is spliced in right after `f`.
//! The successor is resolved before the old bucket can be dropped, so no
//! handle is ever read after it has been released.
//!
//! Counts saturate at `u64::MAX`; an access at the ceiling refreshes the key's
//! recency inside the top bucket.

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

/// Frequency assigned to a freshly inserted key.
const INITIAL_FREQUENCY: u64 = 1;

struct Bucket<K> {
    frequency: u64,
    keys: List<K>,
}

impl<K> Bucket<K> {
    fn new(frequency: u64) -> Self {
        Bucket {
            frequency,
            keys: List::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    bucket: NodeId,
    slot: NodeId,
}

/// Tracks access counts and evicts the least frequently used key.
pub struct LfuTracker<K, S = DefaultHashBuilder> {
    buckets: List<Bucket<K>>,
    index: HashMap<K, Position, S>,
}

impl<K: Hash + Eq + Clone> LfuTracker<K, DefaultHashBuilder> {
    /// Creates a tracker whose index is pre-sized for `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> LfuTracker<K, S> {
    /// Creates a tracker whose index uses `hash_builder`.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        LfuTracker {
            buckets: List::new(),
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Current access count of `key`.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.index.get(key)?;
        self.buckets.get(pos.bucket).map(|b| b.frequency)
    }

    /// Frequency of the front bucket, which holds the next victim.
    pub fn min_frequency(&self) -> Option<u64> {
        self.buckets.front().map(|b| b.frequency)
    }

    /// Frequency of the back bucket.
    pub fn max_frequency(&self) -> Option<u64> {
        self.buckets.back().map(|b| b.frequency)
    }

    /// Number of distinct frequencies currently held.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterates `(key, frequency)` pairs, lowest frequency first and most
    /// recently touched first within a frequency.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.buckets
            .iter()
            .flat_map(|b| b.keys.iter().map(move |k| (k, b.frequency)))
    }

    fn bucket_frequency(&self, id: NodeId) -> Option<u64> {
        self.buckets.get(id).map(|b| b.frequency)
    }

    /// Returns the handle of the bucket holding `frequency` that sits right
    /// after `anchor`, creating it if needed.
    fn successor_bucket(&mut self, anchor: NodeId, frequency: u64) -> Option<NodeId> {
        match self.buckets.next_id(anchor) {
            Some(next) if self.bucket_frequency(next) == Some(frequency) => Some(next),
            _ => self.buckets.insert_after(anchor, Bucket::new(frequency)),
        }
    }

    /// Drops `id` if it no longer holds any key.
    fn release_if_empty(&mut self, id: NodeId) {
        let empty = self.buckets.get(id).map_or(false, |b| b.keys.is_empty());
        if empty {
            self.buckets.remove(id);
        }
    }

    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut previous: Option<u64> = None;
        let mut listed = 0;
        for bucket in self.buckets.iter() {
            if bucket.keys.is_empty() {
                return Err(InvariantError::new("empty LFU bucket persisted"));
            }
            if previous.is_some_and(|prev| bucket.frequency <= prev) {
                return Err(InvariantError::new("LFU buckets out of order"));
            }
            previous = Some(bucket.frequency);
            listed += bucket.keys.len();
        }
        if listed != self.index.len() {
            return Err(InvariantError::new("LFU buckets and index differ in length"));
        }

        for (key, pos) in self.index.iter() {
            let bucket = self
                .buckets
                .get(pos.bucket)
                .ok_or_else(|| InvariantError::new("LFU index points at a dead bucket"))?;
            if bucket.keys.get(pos.slot) != Some(key) {
                return Err(InvariantError::new("LFU index points at the wrong slot"));
            }
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> EvictionTracker<K> for LfuTracker<K, S> {
    /// Tracks `key` at frequency one. A key that is already tracked counts as
    /// an access instead.
    fn record_insertion(&mut self, key: K) {
        if self.index.contains_key(&key) {
            self.record_access(&key);
            return;
        }

        let bucket = match self.buckets.front_id() {
            Some(front) if self.bucket_frequency(front) == Some(INITIAL_FREQUENCY) => front,
            _ => self.buckets.push_front(Bucket::new(INITIAL_FREQUENCY)),
        };
        let Some(target) = self.buckets.get_mut(bucket) else {
            debug_assert!(false, "freshly resolved bucket is missing");
            return;
        };
        let slot = target.keys.push_front(key.clone());
        self.index.insert(key, Position { bucket, slot });
    }

    fn evict_victim(&mut self) -> Option<K> {
        let front = self.buckets.front_id()?;
        let victim = self.buckets.get_mut(front)?.keys.pop_back()?;
        self.release_if_empty(front);
        self.index.remove(&victim);
        Some(victim)
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(pos) = self.index.remove(key) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(pos.bucket) {
            bucket.keys.remove(pos.slot);
        }
        self.release_if_empty(pos.bucket);
        true
    }

    fn peek_victim(&self) -> Option<&K> {
        self.buckets.front().and_then(|b| b.keys.back())
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
        self.buckets.clear();
        self.index.clear();
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> AccessTracker<K> for LfuTracker<K, S> {
    fn record_access<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(pos) = self.index.get(key).copied() else {
            return;
        };
        let Some(frequency) = self.bucket_frequency(pos.bucket) else {
            return;
        };

        if frequency == u64::MAX {
            if let Some(bucket) = self.buckets.get_mut(pos.bucket) {
                bucket.keys.move_to_front(pos.slot);
            }
            return;
        }

        let Some(target) = self.successor_bucket(pos.bucket, frequency + 1) else {
            return;
        };
        let Some(owned) = self
            .buckets
            .get_mut(pos.bucket)
            .and_then(|b| b.keys.remove(pos.slot))
        else {
            self.release_if_empty(target);
            return;
        };
        let Some(slot) = self.buckets.get_mut(target).map(|b| b.keys.push_front(owned)) else {
            debug_assert!(false, "successor bucket vanished");
            return;
        };
        self.release_if_empty(pos.bucket);

        if let Some(entry) = self.index.get_mut(key) {
            *entry = Position {
                bucket: target,
                slot,
            };
        }
    }
}

impl<K: fmt::Debug, S> fmt::Debug for LfuTracker<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for bucket in self.buckets.iter() {
            list.entry(&(bucket.frequency, &bucket.keys));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn snapshot(t: &LfuTracker<i32>) -> Vec<(i32, u64)> {
        t.iter().map(|(k, f)| (*k, f)).collect()
    }

    #[test]
    fn test_insert_starts_at_one() {
        let mut t = LfuTracker::new(4);
        t.record_insertion(1);
        t.record_insertion(2);
        assert_eq!(t.frequency(&1), Some(1));
        assert_eq!(t.bucket_count(), 1);
        assert_eq!(snapshot(&t), vec![(2, 1), (1, 1)]);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_access_promotes_and_drops_empty_bucket() {
        let mut t = LfuTracker::new(4);
        t.record_insertion(1);
        t.record_access(&1);
        assert_eq!(t.frequency(&1), Some(2));
        assert_eq!(t.bucket_count(), 1);
        assert_eq!(t.min_frequency(), Some(2));

        t.record_access(&1);
        t.record_access(&1);
        assert_eq!(t.frequency(&1), Some(4));
        assert_eq!(t.bucket_count(), 1);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_promotion_reuses_adjacent_bucket() {
        let mut t = LfuTracker::new(4);
        t.record_insertion(1);
        t.record_insertion(2);
        t.record_access(&1);
        t.record_access(&2);
        assert_eq!(t.bucket_count(), 1);
        assert_eq!(snapshot(&t), vec![(2, 2), (1, 2)]);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_promotion_splices_between_buckets() {
        let mut t = LfuTracker::new(4);
        t.record_insertion(1);
        t.record_insertion(2);
        for _ in 0..3 {
            t.record_access(&2);
        }
        t.record_insertion(3);
        t.record_access(&1);
        assert_eq!(snapshot(&t), vec![(3, 1), (1, 2), (2, 4)]);
        assert_eq!(t.bucket_count(), 3);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_new_key_after_front_bucket_moved_up() {
        let mut t = LfuTracker::new(4);
        t.record_insertion(1);
        t.record_access(&1);
        t.record_insertion(2);
        assert_eq!(t.min_frequency(), Some(1));
        assert_eq!(t.max_frequency(), Some(2));
        assert_eq!(t.peek_victim(), Some(&2));
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_evicts_lowest_frequency_then_least_recent() {
        let mut t = LfuTracker::new(4);
        for k in 1..=3 {
            t.record_insertion(k);
        }
        t.record_access(&1);
        t.record_access(&1);
        t.record_access(&2);
        assert_eq!(t.evict_victim(), Some(3));

        t.record_insertion(4);
        t.record_insertion(5);
        t.record_access(&4);
        // 2 and 4 both sit at frequency two; 2 was touched earlier
        assert_eq!(t.evict_victim(), Some(5));
        assert_eq!(t.evict_victim(), Some(2));
        assert_eq!(t.evict_victim(), Some(4));
        assert_eq!(t.evict_victim(), Some(1));
        assert_eq!(t.evict_victim(), None);
        assert_eq!(t.bucket_count(), 0);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_cleans_bucket() {
        let mut t = LfuTracker::new(4);
        t.record_insertion(1);
        t.record_insertion(2);
        t.record_access(&2);
        assert!(t.remove(&2));
        assert_eq!(t.bucket_count(), 1);
        assert!(!t.remove(&2));
        assert_eq!(t.frequency(&2), None);
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_reinsert_counts_as_access() {
        let mut t = LfuTracker::new(2);
        t.record_insertion(1);
        t.record_insertion(1);
        assert_eq!(t.len(), 1);
        assert_eq!(t.frequency(&1), Some(2));
    }

    #[test]
    fn test_saturated_frequency_refreshes_recency() {
        let mut t: LfuTracker<i32> = LfuTracker::new(2);
        t.record_insertion(1);
        t.record_insertion(2);
        let front = t.buckets.front_id().unwrap();
        t.buckets.get_mut(front).unwrap().frequency = u64::MAX;
        assert_eq!(t.peek_victim(), Some(&1));
        t.record_access(&1);
        assert_eq!(t.frequency(&1), Some(u64::MAX));
        assert_eq!(t.peek_victim(), Some(&2));
        t.check_invariants().unwrap();
    }

    #[test]
    fn test_clear() {
        let mut t = LfuTracker::new(2);
        t.record_insertion(1);
        t.record_access(&1);
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.min_frequency(), None);
        t.record_insertion(1);
        assert_eq!(t.frequency(&1), Some(1));
    }
}
