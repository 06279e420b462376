//! Process-wide name→factory registries for mappers, reducers, partitioners,
//! and key comparers (spec.md §4.6).
//!
//! Mappers and reducers are registered by a factory that produces a fresh
//! instance per task; partitioners and comparers are registered as shared,
//! stateless singletons. Registration is expected during program
//! initialization (`main`, or a `ctor`-style static); lookups afterward are
//! read-only and safe to call concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{Error, Result};
use crate::mapreduce::job::{KeyComparer, Mapper, Partitioner, Reducer};

type MapperFactory = Box<dyn Fn() -> Box<dyn Mapper> + Send + Sync>;
type ReducerFactory = Box<dyn Fn() -> Box<dyn Reducer> + Send + Sync>;

fn mappers() -> &'static Mutex<HashMap<String, MapperFactory>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, MapperFactory>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn reducers() -> &'static Mutex<HashMap<String, ReducerFactory>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, ReducerFactory>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn partitioners() -> &'static Mutex<HashMap<String, Arc<dyn Partitioner>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<dyn Partitioner>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn comparers() -> &'static Mutex<HashMap<String, Arc<dyn KeyComparer>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<dyn KeyComparer>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Registers a mapper factory under `name`, replacing any prior registration.
pub fn register_mapper<F>(name: impl Into<String>, factory: F)
where
    F: Fn() -> Box<dyn Mapper> + Send + Sync + 'static,
{
    mappers().lock().unwrap().insert(name.into(), Box::new(factory));
}

/// Registers a reducer factory under `name`, replacing any prior
/// registration.
pub fn register_reducer<F>(name: impl Into<String>, factory: F)
where
    F: Fn() -> Box<dyn Reducer> + Send + Sync + 'static,
{
    reducers().lock().unwrap().insert(name.into(), Box::new(factory));
}

/// Registers a partitioner singleton under `name`.
pub fn register_partitioner(name: impl Into<String>, partitioner: Arc<dyn Partitioner>) {
    partitioners().lock().unwrap().insert(name.into(), partitioner);
}

/// Registers a key-comparer singleton under `name`.
pub fn register_comparer(name: impl Into<String>, comparer: Arc<dyn KeyComparer>) {
    comparers().lock().unwrap().insert(name.into(), comparer);
}

pub(crate) fn is_mapper_registered(name: &str) -> bool {
    mappers().lock().unwrap().contains_key(name)
}

pub(crate) fn is_reducer_registered(name: &str) -> bool {
    reducers().lock().unwrap().contains_key(name)
}

pub(crate) fn is_partitioner_registered(name: &str) -> bool {
    partitioners().lock().unwrap().contains_key(name)
}

pub(crate) fn is_comparer_registered(name: &str) -> bool {
    comparers().lock().unwrap().contains_key(name)
}

/// Produces a fresh mapper instance from the factory registered as `name`.
pub fn mapper(name: &str) -> Result<Box<dyn Mapper>> {
    let registry = mappers().lock().unwrap();
    let factory = registry.get(name).ok_or_else(|| Error::NotRegistered {
        kind: "mapper",
        name: name.to_string(),
    })?;
    Ok(factory())
}

/// Produces a fresh reducer instance from the factory registered as `name`.
pub fn reducer(name: &str) -> Result<Box<dyn Reducer>> {
    let registry = reducers().lock().unwrap();
    let factory = registry.get(name).ok_or_else(|| Error::NotRegistered {
        kind: "reducer",
        name: name.to_string(),
    })?;
    Ok(factory())
}

/// Returns the partitioner singleton registered as `name`.
pub fn partitioner(name: &str) -> Result<Arc<dyn Partitioner>> {
    partitioners()
        .lock()
        .unwrap()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::NotRegistered {
            kind: "partitioner",
            name: name.to_string(),
        })
}

/// Returns the key-comparer singleton registered as `name`.
pub fn comparer(name: &str) -> Result<Arc<dyn KeyComparer>> {
    comparers()
        .lock()
        .unwrap()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::NotRegistered {
            kind: "comparer",
            name: name.to_string(),
        })
}
