use thiserror::Error;

/// The crate's result alias; every fallible operation in `partk` returns this.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the task pool, the priority queues, and the MapReduce
/// engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A [`Specification`](crate::mapreduce::Specification) was submitted to
    /// [`run_computation`](crate::mapreduce::run_computation) without a
    /// mapper, reducer, or dataset, or with a zero count.
    #[error("invalid specification: {0}")]
    InvalidSpecification(String),

    /// A mapper/reducer/partitioner/comparer name has no matching factory in
    /// the registry.
    #[error("{kind} {name:?} is not registered")]
    NotRegistered { kind: &'static str, name: String },

    /// A [`Dataset`](crate::mapreduce::Dataset) was indexed beyond its size.
    #[error("index {index} out of bounds for dataset of size {size}")]
    OutOfBounds { index: usize, size: usize },

    /// `top`/`extract_top` was called on an empty priority queue.
    #[error("priority queue is empty")]
    EmptyQueue,

    /// A handle's witness is dead, its identity is absent, or it was issued
    /// by a different queue than the one the operation was invoked on.
    #[error("handle is invalid")]
    InvalidHandle,

    /// `update_priority` was given a priority that moves the node away from
    /// the top under the queue's comparer.
    #[error("update_priority must move the node toward the top")]
    MonotonicityViolation,

    /// A task was awaited after the pool had begun shutting down and was
    /// discarded before a worker picked it up.
    #[error("task was cancelled")]
    Cancelled,

    /// A task unit panicked; the payload is recovered (as a string, where
    /// the panic carried one) instead of propagating the panic itself.
    #[error("task failed: {0}")]
    Failure(String),
}

impl Error {
    /// Converts a caught unwind payload, as produced by
    /// [`std::panic::catch_unwind`], into a [`Failure`](Error::Failure).
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "task panicked with a non-string payload".to_string()
        };
        Error::Failure(message)
    }
}
