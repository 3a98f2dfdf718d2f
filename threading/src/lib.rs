mod bag;
mod future;
mod pool;
mod queue;
mod task;

pub use bag::VariableBag;
pub use error::error::PoolError;
pub use future::JobFuture;
pub use pool::{DestroyMode, ThreadPool};
pub use task::Task;
