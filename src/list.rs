//! Arena-backed doubly linked list.
//!
//! Nodes are stored in a slab (`Vec`) and linked to their neighbours by
//! [`NodeId`] handles instead of pointers. Freed slots are threaded onto an
//! internal free list and reused by later insertions, so a list that churns at
//! a steady size never reallocates.
//!
//! ```text
//!   slots
//!   ┌───────┬──────────────────────────────────────────┐
//!   │ index │ slot                                     │
//!   ├───────┼──────────────────────────────────────────┤
//!   │   0   │ Occupied { value: A, prev: -, next: 2 }  │
//!   │   1   │ Vacant   { next_free: - }                │
//!   │   2   │ Occupied { value: B, prev: 0, next: - }  │
//!   └───────┴──────────────────────────────────────────┘
//!
//!   head ─► [0] ◄──► [2] ◄── tail          free ─► [1]
//! ```
//!
//! All operations other than iteration and `clear` are O(1).
//!
//! A handle stays valid until the node it names is removed. After removal the
//! slot may be handed out again, so callers that keep handles in a side index
//! must drop the index entry at the same time as the node.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::mem;

/// Stable handle to a node inside a [`List`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw slot index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

struct Node<T> {
    value: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

/// A doubly linked list whose nodes live in a slab and are addressed by [`NodeId`].
///
/// # Examples
///
/// ```
/// use policy_cache::list::List;
///
/// let mut list = List::new();
/// let a = list.push_back("a");
/// list.push_back("b");
/// list.push_back("c");
///
/// list.move_to_front(a);
/// assert_eq!(list.pop_back(), Some("c"));
/// assert_eq!(list.front(), Some(&"a"));
/// ```
pub struct List<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        List {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of nodes in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` names a live node of this list.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Handle of the first node.
    #[inline]
    pub fn front_id(&self) -> Option<NodeId> {
        self.head
    }

    /// Handle of the last node.
    #[inline]
    pub fn back_id(&self) -> Option<NodeId> {
        self.tail
    }

    /// Value of the first node.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Value of the last node.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Handle of the node that follows `id`.
    pub fn next_id(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.next)
    }

    /// Handle of the node that precedes `id`.
    pub fn prev_id(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.prev)
    }

    /// Returns a reference to the value stored at `id`.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    /// Returns a mutable reference to the value stored at `id`.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    /// Inserts `value` at the front and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let id = self.allocate(value);
        self.link_front(id);
        self.len += 1;
        id
    }

    /// Inserts `value` at the back and returns its handle.
    pub fn push_back(&mut self, value: T) -> NodeId {
        let id = self.allocate(value);
        self.link_back(id);
        self.len += 1;
        id
    }

    /// Inserts `value` directly after the node `anchor`.
    ///
    /// Returns `None` (and drops nothing but `value`) if `anchor` is not a
    /// live node of this list.
    pub fn insert_after(&mut self, anchor: NodeId, value: T) -> Option<NodeId> {
        if !self.contains(anchor) {
            return None;
        }
        let id = self.allocate(value);
        self.link_after(anchor, id);
        self.len += 1;
        Some(id)
    }

    /// Removes the first node and returns its value.
    pub fn pop_front(&mut self) -> Option<T> {
        let id = self.head?;
        self.remove(id)
    }

    /// Removes the last node and returns its value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks the node `id` and returns its value.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.unlink(id)?;
        self.len -= 1;
        self.release(id)
    }

    /// Moves the node `id` to the front. Returns `false` if `id` is not live.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.unlink(id);
        self.link_front(id);
        true
    }

    /// Removes every node. Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates values from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    #[inline]
    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        match self.slots.get(id.0)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    fn allocate(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        if let Some(index) = self.free_head {
            if let Some(slot) = self.slots.get_mut(index) {
                if let Slot::Vacant { next_free } = *slot {
                    self.free_head = next_free;
                    *slot = Slot::Occupied(node);
                    return NodeId(index);
                }
            }
        }
        self.slots.push(Slot::Occupied(node));
        NodeId(self.slots.len() - 1)
    }

    fn release(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }
        let old = mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        match old {
            Slot::Occupied(node) => Some(node.value),
            Slot::Vacant { .. } => None,
        }
    }

    fn unlink(&mut self, id: NodeId) -> Option<()> {
        let (prev, next) = {
            let node = self.node(id)?;
            (node.prev, node.next)
        };

        match prev.and_then(|p| self.node_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(id)?;
        node.prev = None;
        node.next = None;
        Some(())
    }

    fn link_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|h| self.node_mut(h)) {
            Some(head_node) => head_node.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn link_back(&mut self, id: NodeId) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(id) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail.and_then(|t| self.node_mut(t)) {
            Some(tail_node) => tail_node.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    fn link_after(&mut self, anchor: NodeId, id: NodeId) {
        let next = self.next_id(anchor);
        if let Some(node) = self.node_mut(id) {
            node.prev = Some(anchor);
            node.next = next;
        }
        if let Some(anchor_node) = self.node_mut(anchor) {
            anchor_node.next = Some(id);
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(next_node) => next_node.prev = Some(id),
            None => self.tail = Some(id),
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Front-to-back iterator over a [`List`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.node(id)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn collect<T: Clone>(list: &List<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn test_push_and_pop_both_ends() {
        let mut list = List::new();
        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(list.len(), 3);
        assert_eq!(collect(&list), vec![1, 2, 3]);

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        assert_eq!(list.front_id(), None);
        assert_eq!(list.back_id(), None);
    }

    #[test]
    fn test_remove_middle_relinks_neighbours() {
        let mut list = List::new();
        let a = list.push_back('a');
        let b = list.push_back('b');
        let c = list.push_back('c');

        assert_eq!(list.remove(b), Some('b'));
        assert_eq!(collect(&list), vec!['a', 'c']);
        assert_eq!(list.next_id(a), Some(c));
        assert_eq!(list.prev_id(c), Some(a));
        assert_eq!(list.remove(b), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = List::new();
        let a = list.push_back(1);
        list.push_back(2);
        let c = list.push_back(3);

        assert!(list.move_to_front(c));
        assert_eq!(collect(&list), vec![3, 1, 2]);
        assert!(list.move_to_front(c));
        assert_eq!(collect(&list), vec![3, 1, 2]);
        assert!(list.move_to_front(a));
        assert_eq!(collect(&list), vec![1, 3, 2]);
        assert_eq!(list.back(), Some(&2));
    }

    #[test]
    fn test_insert_after() {
        let mut list = List::new();
        let a = list.push_back(10);
        let c = list.push_back(30);
        let b = list.insert_after(a, 20).unwrap();
        assert_eq!(collect(&list), vec![10, 20, 30]);
        assert_eq!(list.next_id(b), Some(c));

        let d = list.insert_after(c, 40).unwrap();
        assert_eq!(list.back_id(), Some(d));
        assert_eq!(collect(&list), vec![10, 20, 30, 40]);

        list.remove(b);
        assert_eq!(list.insert_after(b, 99), None);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut list = List::with_capacity(4);
        let a = list.push_back("a");
        let b = list.push_back("b");
        list.remove(a);
        list.remove(b);
        let c = list.push_back("c");
        let d = list.push_back("d");
        assert!(c.index() < 2);
        assert!(d.index() < 2);
        assert_eq!(list.slots.len(), 2);
        assert_eq!(collect(&list), vec!["c", "d"]);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut list = List::new();
        let a = list.push_back(1);
        list.push_back(2);
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(a));
        assert_eq!(list.iter().count(), 0);
        list.push_front(3);
        assert_eq!(collect(&list), vec![3]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = List::new();
        let a = list.push_back(1);
        if let Some(v) = list.get_mut(a) {
            *v = 5;
        }
        assert_eq!(list.get(a), Some(&5));
        assert_eq!(list.iter().len(), 1);
    }
}
