//! Priority-queue scenarios spanning both heap variants (spec.md §8).

use partk::{BinaryHeap, BinomialHeap};

#[test]
fn update_priority_scenario_with_max_at_top_binary() {
    let mut heap = BinaryHeap::new();
    let h15 = heap.insert(15, 12);
    let h23 = heap.insert(23, 9);
    let h24 = heap.insert(24, 7);
    let h16 = heap.insert(16, 42);
    heap.insert(100, 24);

    heap.update_priority(&h15, 1).unwrap();
    assert_eq!(heap.extract_top().unwrap(), (15, 1));

    heap.update_priority(&h23, 5).unwrap();
    assert_eq!(heap.extract_top().unwrap(), (23, 5));

    heap.update_priority(&h16, 41).unwrap();
    assert_eq!(heap.top().unwrap(), (&24, &7));

    assert!(!h15.is_valid());
    assert!(h24.is_valid());
    assert_eq!(heap.node(&h24).unwrap(), (&24, &7));
}

#[test]
fn update_priority_scenario_with_max_at_top_binomial() {
    let mut heap = BinomialHeap::new();
    let h15 = heap.insert(15, 12);
    let h23 = heap.insert(23, 9);
    let h24 = heap.insert(24, 7);
    let h16 = heap.insert(16, 42);
    heap.insert(100, 24);

    heap.update_priority(&h15, 1).unwrap();
    assert_eq!(heap.extract_top().unwrap(), (15, 1));

    heap.update_priority(&h23, 5).unwrap();
    assert_eq!(heap.extract_top().unwrap(), (23, 5));

    heap.update_priority(&h16, 41).unwrap();
    assert_eq!(heap.top().unwrap(), (24, 7));

    assert!(!h15.is_valid());
    assert!(h24.is_valid());
}

#[test]
fn heap_monotonic_extraction_binary() {
    use rand::Rng;
    let mut rng = rand::rng();
    let mut heap = BinaryHeap::new();
    for i in 0..50_000 {
        let priority: i64 = rng.random_range(0..1_000_000);
        heap.insert(i, priority);
    }
    let mut last = i64::MAX;
    while let Ok((_, priority)) = heap.extract_top() {
        assert!(priority <= last);
        last = priority;
    }
}

#[test]
fn heap_monotonic_extraction_binomial() {
    use rand::Rng;
    let mut rng = rand::rng();
    let mut heap = BinomialHeap::new();
    for i in 0..50_000 {
        let priority: i64 = rng.random_range(0..1_000_000);
        heap.insert(i, priority);
    }
    let mut last = i64::MAX;
    while let Ok((_, priority)) = heap.extract_top() {
        assert!(priority <= last);
        last = priority;
    }
}

#[test]
fn cross_queue_handle_rejection_binary() {
    let mut q1 = BinaryHeap::new();
    let mut q2 = BinaryHeap::new();
    let handle = q1.insert("a", 1);
    q2.insert("b", 1);
    assert!(matches!(
        q2.update_priority(&handle, 5),
        Err(partk::Error::InvalidHandle)
    ));
}

#[test]
fn handle_becomes_invalid_after_queue_is_dropped_binary() {
    let mut heap = BinaryHeap::new();
    let handle = heap.insert("a", 1);
    assert!(handle.is_valid());
    drop(heap);
    assert!(!handle.is_valid());
}

#[test]
fn handle_becomes_invalid_after_queue_is_dropped_binomial() {
    let mut heap = BinomialHeap::new();
    let handle = heap.insert("a", 1);
    assert!(handle.is_valid());
    drop(heap);
    assert!(!handle.is_valid());
}

#[test]
fn cross_queue_handle_rejection_binomial() {
    let mut q1 = BinomialHeap::new();
    let mut q2 = BinomialHeap::new();
    let handle = q1.insert("a", 1);
    q2.insert("b", 1);
    assert!(matches!(
        q2.update_priority(&handle, 5),
        Err(partk::Error::InvalidHandle)
    ));
}
