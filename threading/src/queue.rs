use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::task::Task;

/// FIFO of owned [`Task`]s behind its own lock, separate from the pool's
/// state mutex — grounded on the `util::queue::RecordQueue` shape
/// (`Arc<Mutex<Vec<_>>>` with push/pop under the lock) but structured as a
/// deque so both ends are O(1), matching the C++ original's
/// `std::deque<std::unique_ptr<Task>>`.
///
/// Every public operation takes the lock for its whole duration; no
/// iteration or indexing is exposed — callers only ever see the head of
/// the queue, one task at a time.
#[derive(Default)]
pub(crate) struct TaskQueue {
    inner: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn push_back(&self, task: Task) {
        self.inner.lock().push_back(task);
    }

    /// Moves the head task out, if any. The pool only calls this after
    /// observing non-emptiness under its own mutex, but this returns `None`
    /// rather than assume that observation still holds — see the worker loop
    /// in `pool.rs` for why that race is possible and harmless here.
    pub(crate) fn pop_front(&self) -> Option<Task> {
        self.inner.lock().pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.inner.lock().clear();
    }
}
