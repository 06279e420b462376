//! A small parallel computation toolkit: a task pool, a parallel
//! divide-and-conquer sorter, an in-process MapReduce engine, and two
//! addressable priority queues with stable update-priority handles.

pub mod error;
pub mod mapreduce;
pub mod pool;
pub mod pqueue;
pub mod sort;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
pub use pool::{Completion, TaskPool};
pub use pqueue::{BinaryHeap, BinomialHeap, Handle};

/// Re-exports the crate's most commonly used types for glob import.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::mapreduce::{
        ContainerDataset, Dataset, Mapper, Partitioner, Record, RecordSink, Reducer, Specification,
        run_computation,
    };
    pub use crate::pool::{Completion, TaskPool};
    pub use crate::pqueue::{BinaryHeap, BinomialHeap, Handle};
    pub use crate::sort::sort;
}
