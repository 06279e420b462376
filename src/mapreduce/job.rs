//! Collaborator contracts: `Mapper`, `Reducer`, `Partitioner`, `KeyComparer`
//! (spec.md §4.6, §6). Named after the original source's `base.hpp`, which
//! groups exactly these four contracts together.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::mapreduce::record::Record;

/// The opaque side-channel a [`Specification`](crate::mapreduce::Specification)
/// may attach; made available to every mapper and reducer instance for the
/// duration of one `run_computation` call.
pub type UserData = dyn Any + Send + Sync;

/// Accumulates records emitted by a mapper or reducer invocation.
#[derive(Default)]
pub struct RecordSink(Vec<Record>);

impl RecordSink {
    pub(crate) fn new() -> Self {
        RecordSink(Vec::new())
    }

    pub(crate) fn into_records(self) -> Vec<Record> {
        self.0
    }

    /// Emits an intermediate `(key, value)` pair from a mapper.
    pub fn emit_intermediate(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.0.push(Record::new(key, value));
    }

    /// Emits an output `(key, value)` pair from a reducer.
    pub fn emit(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.0.push(Record::new(key, value));
    }
}

/// Invoked once per dataset item. A fresh instance is created per map task
/// by its registered factory.
pub trait Mapper: Send {
    fn map(&mut self, key: &[u8], value: &[u8], user_data: Option<&UserData>, sink: &mut RecordSink);
}

/// Invoked once per reducer-input group (a key and its ordered values). A
/// fresh instance is created per reduce task by its registered factory.
pub trait Reducer: Send {
    fn reduce(
        &mut self,
        key: &[u8],
        values: &[Vec<u8>],
        user_data: Option<&UserData>,
        sink: &mut RecordSink,
    );
}

/// A pure function from `(key, reducer_count)` to a bucket index. Shared as
/// a stateless singleton across every task that consults it.
pub trait Partitioner: Send + Sync {
    fn partition(&self, key: &[u8], reducer_count: usize) -> usize;
}

/// A strict weak order over keys. Shared as a stateless singleton.
pub trait KeyComparer: Send + Sync {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// `hash(key) mod reducer_count`, the default partitioner.
pub struct DefaultPartitioner;

impl Partitioner for DefaultPartitioner {
    fn partition(&self, key: &[u8], reducer_count: usize) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % reducer_count as u64) as usize
    }
}

/// Byte-lexicographic order, the default key comparer.
pub struct DefaultComparer;

impl KeyComparer for DefaultComparer {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_partitioner_stays_in_range() {
        let partitioner = DefaultPartitioner;
        for key in [b"the".as_slice(), b"cat".as_slice(), b"".as_slice()] {
            assert!(partitioner.partition(key, 7) < 7);
        }
    }

    #[test]
    fn default_partitioner_is_deterministic() {
        let partitioner = DefaultPartitioner;
        assert_eq!(
            partitioner.partition(b"the", 11),
            partitioner.partition(b"the", 11)
        );
    }

    #[test]
    fn default_comparer_is_lexicographic() {
        let comparer = DefaultComparer;
        assert_eq!(comparer.compare(b"cat", b"mat"), Ordering::Less);
        assert_eq!(comparer.compare(b"mat", b"mat"), Ordering::Equal);
    }
}
