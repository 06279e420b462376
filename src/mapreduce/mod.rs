//! In-process MapReduce engine: map → sort → partition → reduce over the
//! task pool (spec.md §4.5).

pub mod computation;
pub mod job;
pub mod record;
pub mod registry;
pub mod specification;

pub use computation::{block_layout, run_computation};
pub use job::{DefaultComparer, DefaultPartitioner, KeyComparer, Mapper, Partitioner, RecordSink, Reducer, UserData};
pub use record::{ContainerDataset, Dataset, Record};
pub use specification::Specification;
