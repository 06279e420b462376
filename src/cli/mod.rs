//! Example MapReduce jobs from `original_source/mapreduce/examples/`,
//! registered against the registry and driven by the `partk` binary's
//! subcommands. Out of scope for behavior guarantees (spec.md §6); kept as
//! demonstrations of the engine.

pub mod inverted_index;
pub mod pmi;
pub mod wordcount;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::mapreduce::{ContainerDataset, Dataset, Record};

/// Registers every example job's mapper/reducer factories. Idempotent:
/// re-registering under the same name simply replaces the prior factory.
pub fn register_all() {
    wordcount::register();
    inverted_index::register();
    pmi::register();
}

/// Reads `path` as one sentence per line, keyed by its 0-based line number,
/// the way each example's `readInputText` does.
pub fn read_sentences(path: &Path) -> Result<Arc<dyn Dataset>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let dataset: ContainerDataset = text
        .lines()
        .enumerate()
        .map(|(index, line)| Record::new(index.to_string(), line))
        .collect();
    Ok(Arc::new(dataset))
}
