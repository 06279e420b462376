//! Builder-style configuration for one `run_computation` invocation (spec.md
//! §3, §4.6).

use std::any::Any;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mapreduce::job::{DefaultComparer, DefaultPartitioner, KeyComparer, Partitioner};
use crate::mapreduce::record::Dataset;
use crate::mapreduce::registry;

/// Immutable-once-built configuration for one MapReduce invocation. Setters
/// validate eagerly: a name setter fails with [`Error::NotRegistered`] if
/// the registry has no matching factory/singleton, and a count setter fails
/// with [`Error::InvalidSpecification`] for a zero count.
#[derive(Clone)]
pub struct Specification {
    mapper_name: Option<String>,
    reducer_name: Option<String>,
    partitioner_name: Option<String>,
    comparer_name: Option<String>,
    dataset: Option<Arc<dyn Dataset>>,
    mapper_count: usize,
    reducer_count: usize,
    sorter_count: usize,
    user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl Default for Specification {
    fn default() -> Self {
        Specification {
            mapper_name: None,
            reducer_name: None,
            partitioner_name: None,
            comparer_name: None,
            dataset: None,
            mapper_count: 1,
            reducer_count: 1,
            sorter_count: 1,
            user_data: None,
        }
    }
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registered mapper name. Fails if no mapper factory is
    /// registered under `name`.
    pub fn with_mapper(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !registry::is_mapper_registered(&name) {
            return Err(Error::NotRegistered { kind: "mapper", name });
        }
        self.mapper_name = Some(name);
        Ok(self)
    }

    /// Sets the registered reducer name. Fails if no reducer factory is
    /// registered under `name`.
    pub fn with_reducer(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !registry::is_reducer_registered(&name) {
            return Err(Error::NotRegistered { kind: "reducer", name });
        }
        self.reducer_name = Some(name);
        Ok(self)
    }

    /// Sets the registered partitioner name. Fails if no partitioner
    /// singleton is registered under `name`.
    pub fn with_partitioner(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !registry::is_partitioner_registered(&name) {
            return Err(Error::NotRegistered {
                kind: "partitioner",
                name,
            });
        }
        self.partitioner_name = Some(name);
        Ok(self)
    }

    /// Sets the registered key-comparer name. Fails if no comparer
    /// singleton is registered under `name`.
    pub fn with_comparer(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !registry::is_comparer_registered(&name) {
            return Err(Error::NotRegistered { kind: "comparer", name });
        }
        self.comparer_name = Some(name);
        Ok(self)
    }

    pub fn with_dataset(mut self, dataset: Arc<dyn Dataset>) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn with_user_data(mut self, user_data: Arc<dyn Any + Send + Sync>) -> Self {
        self.user_data = Some(user_data);
        self
    }

    pub fn with_mapper_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidSpecification("mapper count must be at least 1".into()));
        }
        self.mapper_count = count;
        Ok(self)
    }

    pub fn with_reducer_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidSpecification(
                "reducer count must be at least 1".into(),
            ));
        }
        self.reducer_count = count;
        Ok(self)
    }

    pub fn with_sorter_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidSpecification("sorter count must be at least 1".into()));
        }
        self.sorter_count = count;
        Ok(self)
    }

    pub(crate) fn mapper_name(&self) -> Result<&str> {
        self.mapper_name
            .as_deref()
            .ok_or_else(|| Error::InvalidSpecification("mapper is not set".into()))
    }

    pub(crate) fn reducer_name(&self) -> Result<&str> {
        self.reducer_name
            .as_deref()
            .ok_or_else(|| Error::InvalidSpecification("reducer is not set".into()))
    }

    pub(crate) fn dataset(&self) -> Result<&Arc<dyn Dataset>> {
        self.dataset
            .as_ref()
            .ok_or_else(|| Error::InvalidSpecification("dataset is not set".into()))
    }

    pub fn user_data(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.user_data.as_deref()
    }

    /// A cloned handle to the user-data side channel, suitable for moving
    /// into a `'static` task closure.
    pub(crate) fn user_data_arc(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.user_data.clone()
    }

    pub fn mapper_count(&self) -> usize {
        self.mapper_count
    }

    pub fn reducer_count(&self) -> usize {
        self.reducer_count
    }

    pub fn sorter_count(&self) -> usize {
        self.sorter_count
    }

    /// The configured partitioner, or a freshly allocated
    /// [`DefaultPartitioner`] if none was set.
    pub fn partitioner(&self) -> Result<Arc<dyn Partitioner>> {
        match &self.partitioner_name {
            Some(name) => registry::partitioner(name),
            None => Ok(Arc::new(DefaultPartitioner)),
        }
    }

    /// The configured key comparer, or a freshly allocated
    /// [`DefaultComparer`] if none was set.
    pub fn comparer(&self) -> Result<Arc<dyn KeyComparer>> {
        match &self.comparer_name {
            Some(name) => registry::comparer(name),
            None => Ok(Arc::new(DefaultComparer)),
        }
    }

    /// Checks that mapper, reducer, and dataset are all set. Counts are
    /// already guaranteed non-zero by their setters.
    pub(crate) fn validate(&self) -> Result<()> {
        self.mapper_name()?;
        self.reducer_name()?;
        self.dataset()?;
        Ok(())
    }
}
