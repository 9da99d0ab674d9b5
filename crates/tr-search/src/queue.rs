//! Min-priority queue over `PartialOrd` keys.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::Weight;

/// Heap entry.  `Ord` is reversed so `BinaryHeap` pops the smallest key.
pub(crate) struct Entry<V, W> {
    pub key:    W,
    pub vertex: V,
}

impl<V, W: Weight> PartialEq for Entry<V, W> {
    fn eq(&self, other: &Self) -> bool {
        self.key.partial_cmp(&other.key) == Some(Ordering::Equal)
    }
}

impl<V, W: Weight> Eq for Entry<V, W> {}

impl<V, W: Weight> PartialOrd for Entry<V, W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V, W: Weight> Ord for Entry<V, W> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key.partial_cmp(&self.key).unwrap_or(Ordering::Equal)
    }
}

pub(crate) type MinQueue<V, W> = BinaryHeap<Entry<V, W>>;
