use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use error::error::PoolError;
use tokio::sync::oneshot;

/// The submitter-visible half of a Sync task's result channel.
///
/// Backed by a [`tokio::sync::oneshot`] channel rather than a hand-rolled
/// mutex/condvar pair: the oneshot receiver already provides exactly the
/// "blocking wait for value, once-ready extraction" contract a Sync task's
/// result needs (`blocking_recv`), and its `Err(RecvError)` on a dropped
/// sender already *is* the "broken promise" signal a discarded Sharp task
/// needs.
pub struct JobFuture<R> {
    rx: oneshot::Receiver<Result<R, PoolError>>,
}

impl<R> JobFuture<R> {
    /// Blocks the calling thread until the task completes, then returns its
    /// outcome. Must not be called from inside a Tokio runtime's async
    /// context; this pool never creates one, so that is never a concern for
    /// callers that only use the pool through this crate's public API.
    pub fn get(self) -> Result<R, PoolError> {
        self.rx.blocking_recv().unwrap_or(Err(PoolError::BrokenPromise))
    }

    /// Non-blocking poll: `None` while the task has not completed yet.
    pub fn try_get(&mut self) -> Option<Result<R, PoolError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(PoolError::BrokenPromise)),
        }
    }
}

/// The worker-visible half; wraps `job` so that a panic is captured instead
/// of unwinding through the worker thread — a Sync task's thunk never lets
/// an exception escape the body that runs it.
pub(crate) fn sync_job_channel<F, R>(job: F) -> (Box<dyn FnOnce() + Send>, JobFuture<R>)
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = oneshot::channel::<Result<R, PoolError>>();
    let thunk: Box<dyn FnOnce() + Send> = Box::new(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(job))
            .map_err(|payload| PoolError::BodyFailure(panic_message(&payload)));
        // If the submitter already dropped the future, there is nothing left
        // to deliver the outcome to; that is not a pool-level failure.
        let _ = tx.send(outcome);
    });
    (thunk, JobFuture { rx })
}

/// Best-effort extraction of a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
