//! Addressable binary heap (spec.md §4.3).

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::pqueue::handle::{Handle, Identity, IdentityGenerator, LiveSet};

struct Entry<K, P> {
    key: K,
    priority: P,
    identity: Identity,
}

/// An implicit binary heap keyed by a user priority, addressable through
/// [`Handle`]s that stay valid across sifts and survive until the node they
/// name is extracted or the queue is cleared/dropped.
///
/// `comparer(a, b)` must return true when `a` should sit closer to the top
/// than `b`. The default comparer (`BinaryHeap::new`) is `a > b`, a max-heap.
pub struct BinaryHeap<K, P> {
    data: Vec<Entry<K, P>>,
    id_to_index: HashMap<Identity, usize>,
    identities: IdentityGenerator,
    live: LiveSet,
    comparer: Arc<dyn Fn(&P, &P) -> bool + Send + Sync>,
}

impl<K, P: PartialOrd> BinaryHeap<K, P> {
    /// Creates an empty max-at-top heap (`a > b`).
    pub fn new() -> Self {
        Self::with_comparer(|a: &P, b: &P| a > b)
    }
}

impl<K, P: PartialOrd> Default for BinaryHeap<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> BinaryHeap<K, P> {
    /// Creates an empty heap ordered by `comparer`: `comparer(a, b)` true
    /// means `a` belongs closer to the top than `b`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: Fn(&P, &P) -> bool + Send + Sync + 'static,
    {
        BinaryHeap {
            data: Vec::new(),
            id_to_index: HashMap::new(),
            identities: IdentityGenerator::new(),
            live: LiveSet::new(),
            comparer: Arc::new(comparer),
        }
    }

    /// The number of elements currently in the heap.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Inserts `(key, priority)`, returning a handle to the new node.
    pub fn insert(&mut self, key: K, priority: P) -> Handle {
        let identity = self.identities.next();
        let index = self.data.len();
        self.data.push(Entry {
            key,
            priority,
            identity,
        });
        self.id_to_index.insert(identity, index);
        self.live.insert(identity);
        self.sift_up(index);
        self.live.handle_for(identity)
    }

    /// Returns the current `(key, priority)` named by `handle`.
    pub fn node(&self, handle: &Handle) -> Result<(&K, &P)> {
        self.live.check(handle)?;
        let index = *self
            .id_to_index
            .get(&handle.identity)
            .ok_or(Error::InvalidHandle)?;
        let entry = &self.data[index];
        Ok((&entry.key, &entry.priority))
    }

    /// Returns the `(key, priority)` at the top of the heap.
    pub fn top(&self) -> Result<(&K, &P)> {
        let entry = self.data.first().ok_or(Error::EmptyQueue)?;
        Ok((&entry.key, &entry.priority))
    }

    /// Removes and returns the `(key, priority)` at the top of the heap.
    pub fn extract_top(&mut self) -> Result<(K, P)> {
        if self.data.is_empty() {
            return Err(Error::EmptyQueue);
        }
        let last = self.data.len() - 1;
        self.swap(0, last);
        let entry = self.data.pop().unwrap();
        self.id_to_index.remove(&entry.identity);
        self.live.remove(entry.identity);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Ok((entry.key, entry.priority))
    }

    /// Moves `handle`'s node to `new_priority`, which must be at least as
    /// good as its current priority under this heap's comparer. Fails with
    /// [`Error::MonotonicityViolation`] for a move away from the top.
    pub fn update_priority(&mut self, handle: &Handle, new_priority: P) -> Result<()> {
        self.live.check(handle)?;
        let index = *self.id_to_index.get(&handle.identity).ok_or(Error::InvalidHandle)?;
        if (self.comparer)(&self.data[index].priority, &new_priority) {
            return Err(Error::MonotonicityViolation);
        }
        self.data[index].priority = new_priority;
        self.sift_up(index);
        Ok(())
    }

    /// Invalidates every outstanding handle and empties the heap.
    pub fn clear(&mut self) {
        self.data.clear();
        self.id_to_index.clear();
        self.live.clear();
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
        self.id_to_index.insert(self.data[i].identity, i);
        self.id_to_index.insert(self.data[j].identity, j);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if (self.comparer)(&self.data[index].priority, &self.data[parent].priority) {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut best = index;
            if left < len && (self.comparer)(&self.data[left].priority, &self.data[best].priority) {
                best = left;
            }
            if right < len && (self.comparer)(&self.data[right].priority, &self.data[best].priority) {
                best = right;
            }
            if best == index {
                break;
            }
            self.swap(index, best);
            index = best;
        }
    }

    /// Rebuilds heap order over `items`, discarding any existing content and
    /// issuing a fresh handle per item. Runs `O(n)` bottom-up, using a
    /// signed loop: the source this is modeled on walks the array with an
    /// unsigned index decrementing through zero, which never terminates.
    pub fn build_heap(&mut self, items: Vec<(K, P)>) -> Vec<Handle> {
        self.clear();
        let mut handles = Vec::with_capacity(items.len());
        for (key, priority) in items {
            let identity = self.identities.next();
            let index = self.data.len();
            self.data.push(Entry {
                key,
                priority,
                identity,
            });
            self.id_to_index.insert(identity, index);
            self.live.insert(identity);
            handles.push(self.live.handle_for(identity));
        }
        if self.data.len() > 1 {
            let mut i = self.data.len() / 2;
            loop {
                if i == 0 {
                    self.sift_down(0);
                    break;
                }
                i -= 1;
                self.sift_down(i);
            }
        }
        handles
    }
}

impl<K, P> Drop for BinaryHeap<K, P> {
    /// Flips the witness dead so every outstanding handle reports invalid,
    /// matching `clear()`'s invalidation (spec.md §4.3 "Destruction").
    fn drop(&mut self) {
        self.live.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_priority_order() {
        let mut heap = BinaryHeap::new();
        for priority in [5, 1, 9, 3, 7, 2] {
            heap.insert(priority, priority);
        }
        let mut extracted = Vec::new();
        while let Ok((_, priority)) = heap.extract_top() {
            extracted.push(priority);
        }
        assert_eq!(extracted, vec![9, 7, 5, 3, 2, 1]);
    }

    #[test]
    fn top_on_empty_queue_fails() {
        let heap: BinaryHeap<i32, i32> = BinaryHeap::new();
        assert!(matches!(heap.top(), Err(Error::EmptyQueue)));
    }

    #[test]
    fn update_priority_moves_node_toward_top() {
        let mut heap = BinaryHeap::new();
        heap.insert("a", 1);
        let handle_b = heap.insert("b", 2);
        heap.insert("c", 3);
        heap.update_priority(&handle_b, 10).unwrap();
        assert_eq!(heap.top().unwrap(), (&"b", &10));
    }

    #[test]
    fn update_priority_away_from_top_is_rejected() {
        let mut heap = BinaryHeap::new();
        let handle = heap.insert("a", 5);
        assert!(matches!(
            heap.update_priority(&handle, 1),
            Err(Error::MonotonicityViolation)
        ));
    }

    #[test]
    fn handle_becomes_invalid_after_extraction_and_clear() {
        let mut heap = BinaryHeap::new();
        let handle_a = heap.insert("a", 1);
        let handle_b = heap.insert("b", 2);
        heap.extract_top().unwrap();
        assert!(!handle_b.is_valid());
        assert!(handle_a.is_valid());
        heap.clear();
        assert!(!handle_a.is_valid());
    }

    #[test]
    fn handle_becomes_invalid_after_queue_is_dropped() {
        let mut heap = BinaryHeap::new();
        let handle = heap.insert("a", 1);
        assert!(handle.is_valid());
        drop(heap);
        assert!(!handle.is_valid());
    }

    #[test]
    fn update_priority_rejects_foreign_handle() {
        let mut heap_a = BinaryHeap::new();
        let mut heap_b = BinaryHeap::new();
        let handle = heap_a.insert("a", 1);
        heap_b.insert("b", 1);
        assert!(matches!(
            heap_b.update_priority(&handle, 5),
            Err(Error::InvalidHandle)
        ));
    }

    #[test]
    fn build_heap_orders_bulk_input() {
        let mut heap = BinaryHeap::new();
        let items: Vec<(i32, i32)> = (0..1000).map(|i| (i, i)).collect();
        let handles = heap.build_heap(items);
        assert_eq!(handles.len(), 1000);
        assert_eq!(heap.top().unwrap(), (&999, &999));
        let mut last = i32::MAX;
        while let Ok((_, priority)) = heap.extract_top() {
            assert!(priority <= last);
            last = priority;
        }
    }
}
