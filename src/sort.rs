//! Parallel three-way-partition quicksort built on [`TaskPool`].
//!
//! Each split offloads its `greater` partition as a new pool task and
//! continues on the `less` partition in a tail loop on the current worker,
//! exactly as the single-threaded recursion would, except the `greater` half
//! runs concurrently. This relies on the pool's re-entrant submission: a
//! unit running on a worker may itself submit further units and the sorter
//! never blocks on a subtask it just submitted.

use std::sync::{Arc, Mutex};

use crossbeam_utils::sync::WaitGroup;
use itertools::partition as split_by;

use crate::error::Result;
use crate::pool::{Completion, TaskPool};

const INSERTION_SORT_THRESHOLD: usize = 10;

/// A raw, length-tagged pointer into a slice, asserted `Send` so a disjoint
/// subrange can be handed to a pool task.
///
/// Safety: every caller of [`SendSlice::as_mut_slice`] must ensure the
/// originating slice outlives the pointer and that no other live reference
/// aliases the same range. `sort` upholds this by waiting, via the
/// [`WaitGroup`] passed through every recursive call, for every task
/// touching a subrange before it returns, and every task only ever touches
/// a partition disjoint from its siblings'.
struct SendSlice<T> {
    ptr: *mut T,
    len: usize,
}

unsafe impl<T> Send for SendSlice<T> {}

impl<T> SendSlice<T> {
    fn new(slice: &mut [T]) -> Self {
        SendSlice {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    unsafe fn as_mut_slice<'a>(&self) -> &'a mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

/// Sorts `slice` in place under `less` (a strict weak "less than" order),
/// using a freshly created [`TaskPool`] of `worker_count` workers (clamped
/// to at least one). Blocks until every spawned subtask has finished, then
/// returns the first task failure encountered, if any.
pub fn sort<T, C>(slice: &mut [T], worker_count: usize, less: C) -> Result<()>
where
    T: Clone + Send,
    C: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    if slice.len() < 2 {
        return Ok(());
    }
    let pool = Arc::new(TaskPool::new(worker_count.max(1)));
    let less = Arc::new(less);
    let guard = WaitGroup::new();
    let completions = Arc::new(Mutex::new(Vec::new()));

    sort_chain(
        slice,
        Arc::clone(&pool),
        Arc::clone(&less),
        guard.clone(),
        Arc::clone(&completions),
    );
    guard.wait();

    let completions = Arc::try_unwrap(completions)
        .unwrap_or_else(|_| unreachable!("guard.wait() guarantees every task dropped its clone"))
        .into_inner()
        .unwrap();
    for completion in completions {
        completion.wait()?;
    }
    Ok(())
}

/// Sorts `slice`, tail-looping on the `less` partition and submitting the
/// `greater` partition to `pool` as a new task whenever the slice is large
/// enough to split. `guard` must be threaded through every recursive call
/// (including the ones made from submitted tasks): it is dropped only once
/// this call and everything it spawned have finished, which is exactly what
/// lets [`sort`]'s `guard.wait()` know the whole sort is done.
fn sort_chain<T, C>(
    mut slice: &mut [T],
    pool: Arc<TaskPool>,
    less: Arc<C>,
    guard: WaitGroup,
    completions: Arc<Mutex<Vec<Completion<()>>>>,
) where
    T: Clone + Send,
    C: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    loop {
        let len = slice.len();
        if len < 2 {
            return;
        }
        if len < INSERTION_SORT_THRESHOLD {
            insertion_sort(slice, |a, b| less(a, b));
            return;
        }

        let pivot = slice[len / 2].clone();

        let less1 = Arc::clone(&less);
        let pivot1 = pivot.clone();
        let mid1 = split_by(slice.iter_mut(), move |item| less1(item, &pivot1));
        let (less_part, rest) = slice.split_at_mut(mid1);

        let less2 = Arc::clone(&less);
        let pivot2 = pivot.clone();
        let mid2 = split_by(rest.iter_mut(), move |item| !less2(&pivot2, item));
        let (_equal_part, greater_part) = rest.split_at_mut(mid2);

        if !greater_part.is_empty() {
            let send_greater = SendSlice::new(greater_part);
            let task_pool = Arc::clone(&pool);
            let task_less = Arc::clone(&less);
            let task_guard = guard.clone();
            let task_completions = Arc::clone(&completions);
            let completion = pool.submit(move || {
                let slice = unsafe { send_greater.as_mut_slice() };
                sort_chain(slice, task_pool, task_less, task_guard, task_completions);
            });
            completions.lock().unwrap().push(completion);
        }

        slice = less_part;
    }
}

/// Insertion sort, used directly by the sorter for small subranges and
/// exposed standalone for callers that want a simple in-place sort without
/// spinning up a pool.
pub fn insertion_sort<T, C>(slice: &mut [T], less: C)
where
    C: Fn(&T, &T) -> bool,
{
    for i in 1..slice.len() {
        let mut j = i;
        while j > 0 && less(&slice[j], &slice[j - 1]) {
            slice.swap(j, j - 1);
            j -= 1;
        }
    }
}
