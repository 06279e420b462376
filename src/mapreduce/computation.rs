//! Orchestrates map → sort → partition → reduce over the task pool (spec.md
//! §4.5), the sole entry point being [`run_computation`].

use std::cmp::Ordering;
use std::sync::Arc;

use log::{debug, info};

use crate::error::Result;
use crate::mapreduce::job::RecordSink;
use crate::mapreduce::record::Record;
use crate::mapreduce::registry;
use crate::mapreduce::specification::Specification;
use crate::pool::TaskPool;
use crate::sort;

/// Computes map-stage block boundaries over a dataset of `dataset_size`
/// items using at most `requested_threads` blocks.
///
/// `num_threads = min(requested_threads, dataset_size)` (a block of fewer
/// than one item makes no sense, so `min_per_thread` is 1 and
/// `ceil(dataset_size / 1) == dataset_size`); `block_size = dataset_size /
/// num_threads`, and the last block absorbs the remainder. Empty for an
/// empty dataset — no map tasks are submitted in that case.
pub fn block_layout(dataset_size: usize, requested_threads: usize) -> Vec<(usize, usize)> {
    if dataset_size == 0 {
        return Vec::new();
    }
    let num_threads = requested_threads.clamp(1, dataset_size);
    let block_size = dataset_size / num_threads;
    let mut blocks = Vec::with_capacity(num_threads);
    let mut start = 0;
    for i in 0..num_threads {
        let end = if i + 1 == num_threads {
            dataset_size
        } else {
            start + block_size
        };
        blocks.push((start, end));
        start = end;
    }
    blocks
}

/// Runs one MapReduce computation described by `spec`, returning its output
/// records. Fails with [`Error::InvalidSpecification`](crate::error::Error)
/// if the mapper, reducer, or dataset is unset (counts cannot be zero: their
/// setters on [`Specification`] already reject that).
pub fn run_computation(spec: &Specification) -> Result<Vec<Record>> {
    spec.validate()?;
    let dataset = spec.dataset()?;
    let dataset_size = dataset.size();

    let intermediate = run_map_stage(spec, dataset, dataset_size)?;
    let intermediate = run_sort_stage(spec, intermediate)?;
    let buckets = run_partition_stage(spec, intermediate)?;
    run_reduce_stage(spec, buckets)
}

fn run_map_stage(
    spec: &Specification,
    dataset: &Arc<dyn crate::mapreduce::record::Dataset>,
    dataset_size: usize,
) -> Result<Vec<Record>> {
    let blocks = block_layout(dataset_size, spec.mapper_count());
    if blocks.is_empty() {
        return Ok(Vec::new());
    }
    info!("map stage starting: {} blocks over {dataset_size} records", blocks.len());

    let pool = TaskPool::new(blocks.len());
    let mapper_name = spec.mapper_name()?.to_string();
    let user_data = spec.user_data_arc();
    let handles: Vec<_> = blocks
        .into_iter()
        .map(|(begin, end)| {
            let mapper_name = mapper_name.clone();
            let dataset = Arc::clone(dataset);
            let user_data = user_data.clone();
            pool.submit(move || -> Result<Vec<Record>> {
                let mut mapper = registry::mapper(&mapper_name)?;
                let mut sink = RecordSink::new();
                for index in begin..end {
                    let (key, value) = dataset.get(index)?;
                    mapper.map(key, value, user_data.as_deref(), &mut sink);
                }
                Ok(sink.into_records())
            })
        })
        .collect();

    let mut intermediate = Vec::new();
    for handle in handles {
        intermediate.extend(handle.wait()??);
    }
    debug!("map stage done: {} intermediate records", intermediate.len());
    Ok(intermediate)
}

fn run_sort_stage(spec: &Specification, mut intermediate: Vec<Record>) -> Result<Vec<Record>> {
    let comparer = spec.comparer()?;
    sort::sort(&mut intermediate, spec.sorter_count(), move |a: &Record, b: &Record| {
        comparer.compare(&a.key, &b.key) == Ordering::Less
    })?;
    debug!("sort stage done: {} records", intermediate.len());
    Ok(intermediate)
}

type ReducerGroup = (Vec<u8>, Vec<Vec<u8>>);

fn run_partition_stage(spec: &Specification, intermediate: Vec<Record>) -> Result<Vec<Vec<ReducerGroup>>> {
    let partitioner = spec.partitioner()?;
    let reducer_count = spec.reducer_count();
    let mut buckets: Vec<Vec<ReducerGroup>> = (0..reducer_count).map(|_| Vec::new()).collect();

    let mut i = 0;
    while i < intermediate.len() {
        let key = intermediate[i].key.clone();
        let mut values = Vec::new();
        while i < intermediate.len() && intermediate[i].key == key {
            values.push(intermediate[i].value.clone());
            i += 1;
        }
        let bucket = partitioner.partition(&key, reducer_count);
        buckets[bucket].push((key, values));
    }
    Ok(buckets)
}

fn run_reduce_stage(spec: &Specification, buckets: Vec<Vec<ReducerGroup>>) -> Result<Vec<Record>> {
    let reducer_count = buckets.len();
    info!("reduce stage starting: {reducer_count} buckets");

    let pool = TaskPool::new(reducer_count);
    let reducer_name = spec.reducer_name()?.to_string();
    let user_data = spec.user_data_arc();
    let handles: Vec<_> = buckets
        .into_iter()
        .map(|groups| {
            let reducer_name = reducer_name.clone();
            let user_data = user_data.clone();
            pool.submit(move || -> Result<Vec<Record>> {
                let mut reducer = registry::reducer(&reducer_name)?;
                let mut sink = RecordSink::new();
                for (key, values) in groups {
                    reducer.reduce(&key, &values, user_data.as_deref(), &mut sink);
                }
                Ok(sink.into_records())
            })
        })
        .collect();

    let mut output = Vec::new();
    for handle in handles {
        output.extend(handle.wait()??);
    }
    debug!("reduce stage done: {} output records", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout_absorbs_remainder_in_last_block() {
        let blocks = block_layout(10, 3);
        assert_eq!(blocks, vec![(0, 3), (3, 6), (6, 10)]);
    }

    #[test]
    fn block_layout_never_exceeds_dataset_size() {
        let blocks = block_layout(2, 8);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn block_layout_is_empty_for_empty_dataset() {
        assert!(block_layout(0, 4).is_empty());
    }
}
