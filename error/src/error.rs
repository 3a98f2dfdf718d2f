use thiserror::Error;

/// Error taxonomy for the pool and its task/bag machinery.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("index {index} out of range (size {size})")]
    OutOfRange { index: usize, size: usize },

    #[error("stored value does not match the requested type")]
    TypeMismatch,

    #[error("loop task is missing its predicate or body")]
    LoopNotReady,

    #[error("the pool has been shut down and no longer accepts submissions")]
    PoolStopped,

    #[error("task body failed: {0}")]
    BodyFailure(String),

    #[error("the task was dropped before it produced a result")]
    BrokenPromise,
}
