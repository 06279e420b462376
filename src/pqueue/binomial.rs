//! Addressable binomial heap (spec.md §4.4).
//!
//! Unlike the binary heap, this queue is built from a forest of linked tree
//! nodes (`Rc<RefCell<Node>>`), matching how the source this is modeled on
//! links trees by pointer rather than by array index. Priority queues are
//! not required to be thread-safe (spec.md §5), so `Rc`/`RefCell` is the
//! natural fit here in place of `pool`/`sort`'s `Arc`/`Mutex`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::pqueue::handle::{Handle, Identity, IdentityGenerator, LiveSet};

type NodeRef<K, P> = Rc<RefCell<Node<K, P>>>;

struct Node<K, P> {
    key: K,
    priority: P,
    identity: Identity,
    degree: usize,
    /// Children, linked via `sibling`, head-first in decreasing degree
    /// order: each link prepends the losing root under the winner.
    child: Option<NodeRef<K, P>>,
    sibling: Option<NodeRef<K, P>>,
    parent: Option<Weak<RefCell<Node<K, P>>>>,
}

impl<K, P> Node<K, P> {
    fn new(key: K, priority: P, identity: Identity) -> NodeRef<K, P> {
        Rc::new(RefCell::new(Node {
            key,
            priority,
            identity,
            degree: 0,
            child: None,
            sibling: None,
            parent: None,
        }))
    }
}

/// A mergeable priority queue of binomial trees, addressable through
/// [`Handle`]s that survive both tree linking and the content-swap
/// performed during `update_priority`.
///
/// `comparer(a, b)` must return true when `a` should sit closer to the top
/// than `b`. The default comparer (`BinomialHeap::new`) is `a > b`.
pub struct BinomialHeap<K, P> {
    head: Option<NodeRef<K, P>>,
    nodes: HashMap<Identity, NodeRef<K, P>>,
    identities: IdentityGenerator,
    live: LiveSet,
    comparer: Arc<dyn Fn(&P, &P) -> bool + Send + Sync>,
    len: usize,
}

impl<K, P: PartialOrd> BinomialHeap<K, P> {
    /// Creates an empty max-at-top heap (`a > b`).
    pub fn new() -> Self {
        Self::with_comparer(|a: &P, b: &P| a > b)
    }
}

impl<K, P: PartialOrd> Default for BinomialHeap<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> BinomialHeap<K, P> {
    /// Creates an empty heap ordered by `comparer`: `comparer(a, b)` true
    /// means `a` belongs closer to the top than `b`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: Fn(&P, &P) -> bool + Send + Sync + 'static,
    {
        BinomialHeap {
            head: None,
            nodes: HashMap::new(),
            identities: IdentityGenerator::new(),
            live: LiveSet::new(),
            comparer: Arc::new(comparer),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `(key, priority)` as a new degree-0 tree, unioned into the
    /// forest. Returns a handle to the new node.
    pub fn insert(&mut self, key: K, priority: P) -> Handle {
        let identity = self.identities.next();
        let node = Node::new(key, priority, identity);
        self.nodes.insert(identity, Rc::clone(&node));
        self.live.insert(identity);
        self.union_with(Some(node));
        self.len += 1;
        self.live.handle_for(identity)
    }

    /// Returns a clone of the current `(key, priority)` named by `handle`.
    pub fn node(&self, handle: &Handle) -> Result<(K, P)>
    where
        K: Clone,
        P: Clone,
    {
        self.live.check(handle)?;
        let node = self.nodes.get(&handle.identity).ok_or(Error::InvalidHandle)?;
        let node = node.borrow();
        Ok((node.key.clone(), node.priority.clone()))
    }

    /// Returns a clone of the `(key, priority)` at the winning root.
    pub fn top(&self) -> Result<(K, P)>
    where
        K: Clone,
        P: Clone,
    {
        let winner = self.winning_root().ok_or(Error::EmptyQueue)?;
        let node = winner.borrow();
        Ok((node.key.clone(), node.priority.clone()))
    }

    /// Removes and returns the `(key, priority)` at the winning root.
    pub fn extract_top(&mut self) -> Result<(K, P)> {
        let winner = self.winning_root().ok_or(Error::EmptyQueue)?;

        // Unlink `winner` from the root list.
        let mut cursor = self.head.clone();
        let mut prev: Option<NodeRef<K, P>> = None;
        while let Some(node) = cursor {
            if Rc::ptr_eq(&node, &winner) {
                let next = node.borrow().sibling.clone();
                match &prev {
                    Some(p) => p.borrow_mut().sibling = next,
                    None => self.head = next,
                }
                break;
            }
            prev = Some(Rc::clone(&node));
            cursor = node.borrow().sibling.clone();
        }

        // Reverse the winner's children into a standalone ascending-degree
        // forest with cleared parent pointers, matching the source's
        // `extractTop` reversal before re-merging.
        let first_child = winner.borrow_mut().child.take();
        let mut reversed: Option<NodeRef<K, P>> = None;
        let mut next_child = first_child;
        while let Some(child) = next_child {
            let after = child.borrow_mut().sibling.take();
            child.borrow_mut().parent = None;
            child.borrow_mut().sibling = reversed;
            reversed = Some(child);
            next_child = after;
        }

        self.union_with(reversed);
        let identity = winner.borrow().identity;
        self.nodes.remove(&identity);
        self.live.remove(identity);
        self.len -= 1;

        let node = Rc::try_unwrap(winner)
            .unwrap_or_else(|_| unreachable!("winner is detached from every other reference"))
            .into_inner();
        Ok((node.key, node.priority))
    }

    /// Moves `handle`'s node to `new_priority`, which must be at least as
    /// good as its current priority under this heap's comparer, then
    /// bubbles it up by swapping payload and identity with its parent
    /// rather than restructuring the tree.
    pub fn update_priority(&mut self, handle: &Handle, new_priority: P) -> Result<()> {
        self.live.check(handle)?;
        let node = Rc::clone(
            self.nodes
                .get(&handle.identity)
                .ok_or(Error::InvalidHandle)?,
        );
        if (self.comparer)(&node.borrow().priority, &new_priority) {
            return Err(Error::MonotonicityViolation);
        }
        node.borrow_mut().priority = new_priority;

        let mut y = node;
        loop {
            let parent = y.borrow().parent.as_ref().and_then(Weak::upgrade);
            let Some(p) = parent else { break };
            let should_swap = (self.comparer)(&y.borrow().priority, &p.borrow().priority);
            if !should_swap {
                break;
            }
            std::mem::swap(&mut y.borrow_mut().key, &mut p.borrow_mut().key);
            std::mem::swap(&mut y.borrow_mut().priority, &mut p.borrow_mut().priority);
            let y_identity = y.borrow().identity;
            let p_identity = p.borrow().identity;
            y.borrow_mut().identity = p_identity;
            p.borrow_mut().identity = y_identity;
            self.nodes.insert(p_identity, Rc::clone(&y));
            self.nodes.insert(y_identity, Rc::clone(&p));
            y = p;
        }
        Ok(())
    }

    /// Invalidates every outstanding handle and empties the heap.
    pub fn clear(&mut self) {
        self.head = None;
        self.nodes.clear();
        self.live.clear();
        self.len = 0;
    }

    fn winning_root(&self) -> Option<NodeRef<K, P>> {
        let mut best = self.head.clone()?;
        let mut cursor = best.borrow().sibling.clone();
        while let Some(node) = cursor {
            if (self.comparer)(&node.borrow().priority, &best.borrow().priority) {
                best = Rc::clone(&node);
            }
            cursor = node.borrow().sibling.clone();
        }
        Some(best)
    }

    /// Merges `other` (a root list in increasing degree order, possibly a
    /// single node) into this heap's forest and restores the
    /// increasing-degree, no-duplicate-degree invariant.
    fn union_with(&mut self, other: Option<NodeRef<K, P>>) {
        let mut head = merge_by_degree(self.head.take(), other);
        if head.is_none() {
            return;
        }
        let mut prev: Option<NodeRef<K, P>> = None;
        let mut x = head.clone().unwrap();
        let mut next = x.borrow().sibling.clone();
        while let Some(next_x) = next {
            let x_degree = x.borrow().degree;
            let next_degree = next_x.borrow().degree;
            let next_next_degree = next_x.borrow().sibling.as_ref().map(|n| n.borrow().degree);
            if x_degree != next_degree || next_next_degree == Some(x_degree) {
                prev = Some(Rc::clone(&x));
                x = next_x;
            } else if !(self.comparer)(&next_x.borrow().priority, &x.borrow().priority) {
                // x wins (or ties against next_x): x stays root, next_x becomes its child.
                let after_next = next_x.borrow().sibling.clone();
                x.borrow_mut().sibling = after_next;
                link(next_x, Rc::clone(&x));
            } else {
                // next_x wins: unlink x from the chain, link x under next_x, continue from next_x.
                match &prev {
                    Some(p) => p.borrow_mut().sibling = Some(Rc::clone(&next_x)),
                    None => head = Some(Rc::clone(&next_x)),
                }
                link(Rc::clone(&x), Rc::clone(&next_x));
                x = next_x;
            }
            next = x.borrow().sibling.clone();
        }
        self.head = head;
    }
}

impl<K, P> Drop for BinomialHeap<K, P> {
    /// Flips the witness dead so every outstanding handle reports invalid,
    /// matching `clear()`'s invalidation (spec.md §4.4 "Destruction").
    fn drop(&mut self) {
        self.live.clear();
    }
}

/// Classic merge-by-degree of two root lists, each already sorted by
/// increasing degree (a prerequisite, not re-checked here).
fn merge_by_degree<K, P>(
    first: Option<NodeRef<K, P>>,
    second: Option<NodeRef<K, P>>,
) -> Option<NodeRef<K, P>> {
    let (mut first, mut second) = (first, second);
    let mut result: Option<NodeRef<K, P>> = None;
    let mut tail: Option<NodeRef<K, P>> = None;

    let mut push = |node: NodeRef<K, P>, result: &mut Option<NodeRef<K, P>>, tail: &mut Option<NodeRef<K, P>>| {
        if let Some(t) = tail {
            t.borrow_mut().sibling = Some(Rc::clone(&node));
        } else {
            *result = Some(Rc::clone(&node));
        }
        *tail = Some(node);
    };

    loop {
        match (&first, &second) {
            (Some(f), Some(s)) => {
                if f.borrow().degree <= s.borrow().degree {
                    let next = f.borrow().sibling.clone();
                    let node = first.take().unwrap();
                    first = next;
                    push(node, &mut result, &mut tail);
                } else {
                    let next = s.borrow().sibling.clone();
                    let node = second.take().unwrap();
                    second = next;
                    push(node, &mut result, &mut tail);
                }
            }
            (Some(_), None) => {
                let node = first.take().unwrap();
                let next = node.borrow().sibling.clone();
                push(node, &mut result, &mut tail);
                first = next;
            }
            (None, Some(_)) => {
                let node = second.take().unwrap();
                let next = node.borrow().sibling.clone();
                push(node, &mut result, &mut tail);
                second = next;
            }
            (None, None) => break,
        }
    }
    if let Some(t) = &tail {
        t.borrow_mut().sibling = None;
    }
    result
}

/// Links `y` under `z`: `y` becomes `z`'s new first child, `z`'s degree
/// grows by one. `y` must be the root with the losing priority.
fn link<K, P>(y: NodeRef<K, P>, z: NodeRef<K, P>) {
    y.borrow_mut().parent = Some(Rc::downgrade(&z));
    let old_child = z.borrow().child.clone();
    y.borrow_mut().sibling = old_child;
    z.borrow_mut().child = Some(y);
    z.borrow_mut().degree += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_priority_order() {
        let mut heap = BinomialHeap::new();
        for priority in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
            heap.insert(priority, priority);
        }
        let mut extracted = Vec::new();
        while let Ok((_, priority)) = heap.extract_top() {
            extracted.push(priority);
        }
        assert_eq!(extracted, vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn top_on_empty_queue_fails() {
        let heap: BinomialHeap<i32, i32> = BinomialHeap::new();
        assert!(matches!(heap.top(), Err(Error::EmptyQueue)));
    }

    #[test]
    fn update_priority_bubbles_via_content_swap() {
        let mut heap = BinomialHeap::new();
        let mut handles = Vec::new();
        for priority in 0..16 {
            handles.push(heap.insert(priority, priority));
        }
        let leaf_handle = handles[0].clone();
        heap.update_priority(&leaf_handle, 100).unwrap();
        assert_eq!(heap.top().unwrap(), (100, 100));
        assert!(leaf_handle.is_valid());
    }

    #[test]
    fn update_priority_away_from_top_is_rejected() {
        let mut heap = BinomialHeap::new();
        let handle = heap.insert("a", 5);
        assert!(matches!(
            heap.update_priority(&handle, 1),
            Err(Error::MonotonicityViolation)
        ));
    }

    #[test]
    fn handle_becomes_invalid_after_extraction_and_clear() {
        let mut heap = BinomialHeap::new();
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
        let mut heap = BinomialHeap::new();
        let handle = heap.insert("a", 1);
        assert!(handle.is_valid());
        drop(heap);
        assert!(!handle.is_valid());
    }

    #[test]
    fn union_keeps_the_winner_at_root_on_equal_degree_merge() {
        let mut heap = BinomialHeap::new();
        heap.insert("a", 0);
        heap.insert("b", 1);
        assert_eq!(heap.top().unwrap(), ("b", 1));
    }

    #[test]
    fn update_priority_bubbles_past_a_winning_parent() {
        let mut heap = BinomialHeap::new();
        heap.insert("a", 5);
        // "b" becomes a child of "a" under the (max-at-top) union: 5 beats 1.
        let handle_b = heap.insert("b", 1);
        assert_eq!(heap.top().unwrap(), ("a", 5));
        heap.update_priority(&handle_b, 10).unwrap();
        assert_eq!(heap.top().unwrap(), ("b", 10));
    }

    #[test]
    fn large_random_extraction_is_non_increasing() {
        use rand::Rng;
        let mut rng = rand::rng();
        let mut heap = BinomialHeap::new();
        for _ in 0..5000 {
            let priority: i64 = rng.random_range(0..1_000_000);
            heap.insert(priority, priority);
        }
        let mut last = i64::MAX;
        while let Ok((_, priority)) = heap.extract_top() {
            assert!(priority <= last);
            last = priority;
        }
    }
}
