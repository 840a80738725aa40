//! An indexed binary min-heap.
//!
//! [`IndexedBinaryHeap`] stores items implementing [`HeapItem`].
//! In addition to the usual heap operations, it maintains a map from item keys to heap slots.
//! This makes it possible to find, remove, and re-heapify an arbitrary item in logarithmic time.
//! The shortest path search uses this for decreasing the distance of a node already in the heap.

use std::collections::HashMap;
use std::hash::Hash;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// An item that can be stored in an [`IndexedBinaryHeap`].
pub trait HeapItem {
    /// Type of the key identifying the item.
    type Key: Copy + Eq + Hash;

    /// Type of the priority; smaller values come first.
    type Priority: Copy + Ord;

    /// Returns the key of the item.
    fn key(&self) -> Self::Key;

    /// Returns the priority of the item.
    fn priority(&self) -> Self::Priority;
}

//-----------------------------------------------------------------------------

/// A binary min-heap with an index from keys to heap slots.
///
/// Each key can be in the heap at most once.
/// If the priority of an item changes through [`IndexedBinaryHeap::get_mut`], the heap property must be restored with [`IndexedBinaryHeap::up`] (priority decreased) or [`IndexedBinaryHeap::down`] (priority increased).
///
/// # Examples
///
/// ```
/// use supergraph::heap::{HeapItem, IndexedBinaryHeap};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// struct Item(char, u32);
///
/// impl HeapItem for Item {
///     type Key = char;
///     type Priority = u32;
///     fn key(&self) -> char { self.0 }
///     fn priority(&self) -> u32 { self.1 }
/// }
///
/// let mut heap = IndexedBinaryHeap::new();
/// heap.push(Item('a', 5));
/// heap.push(Item('b', 3));
/// heap.push(Item('c', 4));
/// assert_eq!(heap.top(), Some(&Item('b', 3)));
///
/// // Decrease the priority of `a`.
/// heap.get_mut(&'a').unwrap().1 = 1;
/// heap.up(&'a');
/// assert_eq!(heap.pop(), Some(Item('a', 1)));
///
/// assert_eq!(heap.remove(&'c'), Some(Item('c', 4)));
/// assert_eq!(heap.pop(), Some(Item('b', 3)));
/// assert!(heap.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct IndexedBinaryHeap<T: HeapItem> {
    // Slot `i` is at `heap[i - 1]`.
    heap: Vec<T>,
    slots: HashMap<T::Key, usize>,
}

impl<T: HeapItem> Default for IndexedBinaryHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HeapItem> IndexedBinaryHeap<T> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        IndexedBinaryHeap { heap: Vec::new(), slots: HashMap::new() }
    }

    /// Returns the number of items in the heap.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if the heap is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns `true` if an item with the key is in the heap.
    #[inline]
    pub fn contains(&self, key: &T::Key) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns the item with the smallest priority.
    #[inline]
    pub fn top(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Returns the item with the given key.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.slots.get(key).map(|slot| &self.heap[slot - 1])
    }

    /// Returns a mutable reference to the item with the given key.
    ///
    /// Changing the key of the item is not allowed.
    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        let slot = *self.slots.get(key)?;
        Some(&mut self.heap[slot - 1])
    }

    /// Inserts the item into the heap.
    ///
    /// # Panics
    ///
    /// Will panic if an item with the same key is already in the heap.
    pub fn push(&mut self, item: T) {
        let key = item.key();
        assert!(!self.slots.contains_key(&key), "IndexedBinaryHeap: duplicate key");
        self.heap.push(item);
        let slot = self.heap.len();
        self.slots.insert(key, slot);
        self.sift_up(slot);
    }

    /// Removes and returns the item with the smallest priority.
    pub fn pop(&mut self) -> Option<T> {
        let key = self.top()?.key();
        self.remove(&key)
    }

    /// Removes and returns the item with the given key.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let slot = self.slots.remove(key)?;
        let last = self.heap.len();
        if slot == last {
            return self.heap.pop();
        }
        self.heap.swap(slot - 1, last - 1);
        let item = self.heap.pop();
        self.slots.insert(self.heap[slot - 1].key(), slot);
        // The replacement may belong above or below the slot.
        let slot = self.sift_down(slot);
        self.sift_up(slot);
        item
    }

    /// Moves the item up after its priority has decreased.
    ///
    /// Does nothing if the key is not in the heap.
    pub fn up(&mut self, key: &T::Key) {
        if let Some(slot) = self.slots.get(key).copied() {
            self.sift_up(slot);
        }
    }

    /// Moves the item down after its priority has increased.
    ///
    /// Does nothing if the key is not in the heap.
    pub fn down(&mut self, key: &T::Key) {
        if let Some(slot) = self.slots.get(key).copied() {
            self.sift_down(slot);
        }
    }

    //-------------------------------------------------------------------------

    #[inline]
    fn priority_at(&self, slot: usize) -> T::Priority {
        self.heap[slot - 1].priority()
    }

    fn exchange(&mut self, a: usize, b: usize) {
        self.heap.swap(a - 1, b - 1);
        self.slots.insert(self.heap[a - 1].key(), a);
        self.slots.insert(self.heap[b - 1].key(), b);
    }

    // Returns the final slot.
    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 1 {
            let parent = slot / 2;
            if self.priority_at(parent) <= self.priority_at(slot) {
                break;
            }
            self.exchange(parent, slot);
            slot = parent;
        }
        slot
    }

    // Returns the final slot.
    fn sift_down(&mut self, mut slot: usize) -> usize {
        loop {
            let left = 2 * slot;
            let right = left + 1;
            let mut min = slot;
            if left <= self.len() && self.priority_at(left) < self.priority_at(min) {
                min = left;
            }
            if right <= self.len() && self.priority_at(right) < self.priority_at(min) {
                min = right;
            }
            if min == slot {
                return slot;
            }
            self.exchange(slot, min);
            slot = min;
        }
    }
}

//-----------------------------------------------------------------------------
