//! Key to value storage.
//!
//! [`ValueStore`] is a thin layer over a hash map. It knows nothing about
//! eviction order; the cache controller keeps it in lock-step with one of the
//! trackers in [`crate::policy`].

extern crate alloc;

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

/// Mapping from key to cached value.
pub struct ValueStore<K, V, S = DefaultHashBuilder> {
    map: HashMap<K, V, S>,
}

impl<K: Hash + Eq, V> ValueStore<K, V, DefaultHashBuilder> {
    /// Creates a store sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ValueStore<K, V, S> {
    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ValueStore<K, V, S> {
    /// Creates a store sized for `capacity` entries using `hash_builder`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        ValueStore {
            map: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Stores `value` under `key`, returning the value it replaced.
    #[inline]
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Borrows the value stored under `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key)
    }

    /// Mutably borrows the value stored under `key`.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get_mut(key)
    }

    /// Returns `true` if `key` is stored.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Removes `key`, returning its value if it was present.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove(key)
    }

    /// Removes every entry, keeping the allocated table.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }
}

impl<K, V, S> fmt::Debug for ValueStore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStore")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};

    #[test]
    fn test_set_returns_replaced_value() {
        let mut store = ValueStore::with_capacity(4);
        assert_eq!(store.set("a", 1), None);
        assert_eq!(store.set("a", 2), Some(1));
        assert_eq!(store.get(&"a"), Some(&2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_borrowed_lookup() {
        let mut store: ValueStore<String, u32> = ValueStore::with_capacity(2);
        store.set("alpha".to_string(), 1);
        assert!(store.contains_key("alpha"));
        if let Some(v) = store.get_mut("alpha") {
            *v += 1;
        }
        assert_eq!(store.get("alpha"), Some(&2));
        assert_eq!(store.remove("alpha"), Some(2));
        assert_eq!(store.remove("alpha"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = ValueStore::with_capacity(2);
        store.set(1, 'x');
        store.set(2, 'y');
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.keys().count(), 0);
    }
}
