use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use error::error::PoolError;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::future::{panic_message, JobFuture};
use crate::queue::TaskQueue;
use crate::task::Task;

/// Whether [`ThreadPool::finish`] drains the queue before stopping workers
/// (`Smooth`, the safe default for tasks with observable side effects) or
/// discards it (`Sharp`, for rapid teardown of known-abandoned work).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyMode {
    Smooth,
    Sharp,
}

impl Default for DestroyMode {
    fn default() -> Self {
        DestroyMode::Smooth
    }
}

struct PoolState {
    destroy_mode: DestroyMode,
    worker_count: usize,
    tasks_running: usize,
    working: bool,
    paused: bool,
    waiting: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    tasks_available: Condvar,
    tasks_done: Condvar,
    queue: TaskQueue,
}

/// A fixed-size worker-thread pool.
///
/// Non-`Clone`, non-`Copy`, single-owner: submitters hold a `&ThreadPool`
/// (submission and control operations never need exclusive access, since
/// they only touch state behind `Shared`'s own locks), while `reset` and the
/// `Drop`-driven shutdown need `&mut self` because they own the worker
/// `JoinHandle`s directly.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

fn choose_thread_count(concurrency: usize) -> usize {
    if concurrency > 0 {
        return concurrency;
    }
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl ThreadPool {
    /// Effective worker count is `concurrency` if nonzero, else the
    /// platform's reported parallelism, else `1`.
    pub fn new(concurrency: usize, destroy_mode: DestroyMode) -> Self {
        let worker_count = choose_thread_count(concurrency);
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                destroy_mode,
                worker_count,
                tasks_running: 0,
                working: false,
                paused: false,
                waiting: false,
            }),
            tasks_available: Condvar::new(),
            tasks_done: Condvar::new(),
            queue: TaskQueue::new(),
        });
        let mut pool = ThreadPool {
            shared,
            workers: Vec::new(),
        };
        pool.spawn_workers(worker_count);
        pool
    }

    pub fn with_destroy_mode(destroy_mode: DestroyMode) -> Self {
        Self::new(0, destroy_mode)
    }

    pub fn with_concurrency(concurrency: usize) -> Self {
        Self::new(concurrency, DestroyMode::Smooth)
    }

    pub fn worker_count(&self) -> usize {
        self.shared.state.lock().worker_count
    }

    // ---- submission -----------------------------------------------------

    /// Transfers ownership of a pre-built Async or Loop task into the queue.
    pub fn add_async_task(&self, task: Task) -> Result<(), PoolError> {
        self.submit(task)
    }

    /// Builds an Async task around `job` and enqueues it.
    pub fn add_async_task_fn<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnMut(&mut Task) + Send + 'static,
    {
        let mut task = Task::new();
        task.set_async_job(job);
        self.submit(task)
    }

    /// Transfers ownership of a pre-built Sync task (already carrying its
    /// own future from [`Task::set_sync_job`]) into the queue.
    pub fn add_sync_task(&self, task: Task) -> Result<(), PoolError> {
        self.submit(task)
    }

    /// Builds a Sync task around `job` and enqueues it, returning the future
    /// through which the result (or captured panic) will be observed.
    pub fn add_sync_task_fn<F, R>(&self, job: F) -> Result<JobFuture<R>, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut task = Task::new();
        let future = task.set_sync_job(job);
        self.submit(task)?;
        Ok(future)
    }

    fn submit(&self, task: Task) -> Result<(), PoolError> {
        if !self.shared.state.lock().working {
            return Err(PoolError::PoolStopped);
        }
        self.shared.queue.push_back(task);
        self.shared.tasks_available.notify_one();
        Ok(())
    }

    // ---- control ----------------------------------------------------------

    /// Inhibits future pops; running bodies are not interrupted.
    pub fn pause(&self) {
        self.shared.state.lock().paused = true;
    }

    pub fn continue_(&self) {
        self.shared.state.lock().paused = false;
        self.shared.tasks_available.notify_all();
    }

    /// Discards queued-but-not-running tasks. Tasks already popped into a
    /// worker are unaffected.
    pub fn clear_tasks(&self) {
        self.shared.queue.clear();
    }

    /// Blocks until every worker is idle and either the queue is empty or
    /// the pool is paused — so `wait()` under pause returns as soon as
    /// in-flight bodies finish, even with work still queued.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock();
        state.waiting = true;
        while !(state.tasks_running == 0 && (state.paused || self.shared.queue.is_empty())) {
            self.shared.tasks_done.wait(&mut state);
        }
        state.waiting = false;
    }

    /// Re-creates the worker set, optionally changing concurrency and/or
    /// destroy mode. `None` keeps the current value. Pauses for the
    /// duration of the reset and restores the prior pause state afterward.
    pub fn reset(&mut self, concurrency: Option<usize>, destroy_mode: Option<DestroyMode>) {
        let prior_paused = {
            let mut state = self.shared.state.lock();
            let prior = state.paused;
            state.paused = true;
            if let Some(mode) = destroy_mode {
                state.destroy_mode = mode;
            }
            prior
        };

        self.finish();

        let new_count = choose_thread_count(concurrency.unwrap_or_else(|| self.shared.state.lock().worker_count));
        self.spawn_workers(new_count);
        self.shared.state.lock().paused = prior_paused;
    }

    // ---- lifecycle --------------------------------------------------------

    fn spawn_workers(&mut self, count: usize) {
        {
            let mut state = self.shared.state.lock();
            // Seeded to `count` so each worker's first decrement in
            // `process_loop` lands on the true value with no special case.
            state.tasks_running = count;
            state.worker_count = count;
            state.working = true;
        }
        self.workers = (0..count)
            .map(|index| {
                let shared = self.shared.clone();
                thread::Builder::new()
                    .name(format!("threading-worker-{index}"))
                    .spawn(move || process_loop(shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();
        debug!(count, "thread pool workers started");
    }

    fn stop_workers(&mut self) {
        self.shared.state.lock().working = false;
        self.shared.tasks_available.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked while joining during shutdown");
            }
        }
    }

    fn finish(&mut self) {
        let mode = self.shared.state.lock().destroy_mode;
        match mode {
            DestroyMode::Sharp => {
                self.clear_tasks();
                self.stop_workers();
            }
            DestroyMode::Smooth => {
                self.wait();
                self.stop_workers();
            }
        }
        info!("thread pool workers stopped");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Each worker runs this loop until `working` goes false.
///
/// The order of operations around the decrement/notify/wait/increment dance
/// is what makes `wait()`'s drain predicate correct: the last worker to go
/// idle is guaranteed to observe `waiting` and broadcast `tasks_done`.
fn process_loop(shared: Arc<Shared>) {
    let mut state = shared.state.lock();
    loop {
        state.tasks_running -= 1;
        let should_notify =
            state.waiting && state.tasks_running == 0 && (state.paused || shared.queue.is_empty());
        MutexGuard::unlocked(&mut state, || {
            if should_notify {
                shared.tasks_done.notify_all();
            }
        });

        while !(!(state.paused || shared.queue.is_empty()) || !state.working) {
            shared.tasks_available.wait(&mut state);
        }

        if !state.working {
            break;
        }

        state.tasks_running += 1;
        MutexGuard::unlocked(&mut state, || run_one(&shared));
    }
}

fn run_one(shared: &Arc<Shared>) {
    let Some(mut task) = shared.queue.pop_front() else {
        // Another worker won the race for the only queued task between our
        // wake-up and the pop. Leave `tasks_running` alone: the optimistic
        // increment before this call is balanced by the unconditional
        // decrement at the top of the next `process_loop` iteration.
        return;
    };

    let reschedule = match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
        Ok(reschedule) => reschedule,
        Err(payload) => {
            error!(reason = %panic_message(&payload), "task body failed; task will not be rescheduled");
            false
        }
    };

    if reschedule {
        shared.queue.push_back(task);
    }
}
