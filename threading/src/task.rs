use std::any::TypeId;

use error::error::PoolError;

use crate::bag::VariableBag;
use crate::future::{sync_job_channel, JobFuture};

/// A body shared by Async and Loop tasks: it borrows the owning [`Task`]
/// mutably for the duration of one invocation, so it can read/write `vars`.
pub(crate) type Body = Box<dyn FnMut(&mut Task) + Send>;
/// The Loop guard: same borrow shape as [`Body`], returning whether another
/// iteration should run.
pub(crate) type Predicate = Box<dyn FnMut(&mut Task) -> bool + Send>;
/// The Sync thunk: a zero-argument closure that already captures the job and
/// fulfils its own promise; see [`crate::future::sync_job_channel`].
pub(crate) type SyncThunk = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskKind {
    Sync,
    Async,
    Loop,
}

/// A submittable unit of work: Sync (delivers a result through a future),
/// Async (fire-and-forget), or Loop (Async-shaped body reschedules itself
/// while a predicate holds). Move-only by construction (no `Clone`/`Copy`);
/// ownership transfers into the pool's queue at submission and the task is
/// dropped after its final execution.
pub struct Task {
    kind: TaskKind,
    result_is_void: bool,
    sync_thunk: Option<SyncThunk>,
    body: Option<Body>,
    predicate: Option<Predicate>,
    pub vars: VariableBag,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            kind: TaskKind::Async,
            result_is_void: true,
            sync_thunk: None,
            body: None,
            predicate: None,
            vars: VariableBag::new(),
        }
    }
}

impl Task {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the task as Sync, binds `job`, and returns the future through
    /// which the submitter observes its result (or captured panic).
    /// Clears any prior Async/Loop state — a task's kind and its stored
    /// bodies stay mutually consistent across repeated `set_*_job` calls.
    pub fn set_sync_job<F, R>(&mut self, job: F) -> JobFuture<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.kind = TaskKind::Sync;
        self.result_is_void = TypeId::of::<R>() == TypeId::of::<()>();
        self.body = None;
        self.predicate = None;
        let (thunk, future) = sync_job_channel(job);
        self.sync_thunk = Some(thunk);
        future
    }

    /// Fixes the task as Async and stores `job` as the body. Clears the Sync
    /// thunk and predicate.
    pub fn set_async_job<F>(&mut self, job: F)
    where
        F: FnMut(&mut Task) + Send + 'static,
    {
        self.kind = TaskKind::Async;
        self.result_is_void = true;
        self.sync_thunk = None;
        self.predicate = None;
        self.body = Some(Box::new(job));
    }

    /// Fixes the task as Loop and stores `job` as the body. Leaves the
    /// predicate untouched — the caller must also call
    /// [`set_condition`](Self::set_condition), in either order, before the
    /// task is ever `run()`.
    pub fn set_loop_job<F>(&mut self, job: F)
    where
        F: FnMut(&mut Task) + Send + 'static,
    {
        self.kind = TaskKind::Loop;
        self.result_is_void = true;
        self.sync_thunk = None;
        self.body = Some(Box::new(job));
    }

    /// Fixes the task as Loop and stores `condition` as the predicate.
    /// Leaves the body untouched.
    pub fn set_condition<F>(&mut self, condition: F)
    where
        F: FnMut(&mut Task) -> bool + Send + 'static,
    {
        self.kind = TaskKind::Loop;
        self.result_is_void = true;
        self.sync_thunk = None;
        self.predicate = Some(Box::new(condition));
    }

    /// Meaningful only for Sync tasks: whether `R` was the unit type.
    pub fn result_is_void(&self) -> bool {
        self.result_is_void
    }

    /// Runs the task once. Returns whether it should be rescheduled (only
    /// ever `true` for a Loop task whose predicate held this time).
    ///
    /// For Loop tasks, panics with a [`PoolError::LoopNotReady`]-flavored
    /// message if the predicate or body is missing — that is a programming
    /// error, and it is handled identically to a body panic at the worker
    /// boundary, not specially inside `run()`.
    ///
    /// A panic from an Async/Loop body propagates out of this call; Sync
    /// bodies never panic out of `run()` because their thunk already caught
    /// the panic internally (see [`crate::future::sync_job_channel`]).
    pub fn run(&mut self) -> bool {
        match self.kind {
            TaskKind::Sync => {
                let thunk = self.sync_thunk.take().expect("Sync task missing its thunk");
                thunk();
                false
            }
            TaskKind::Async => {
                let mut body = self.body.take().expect("Async task missing its body");
                body(self);
                self.body = Some(body);
                false
            }
            TaskKind::Loop => {
                let mut predicate = match self.predicate.take() {
                    Some(p) => p,
                    None => panic!("{}", PoolError::LoopNotReady),
                };
                let mut body = match self.body.take() {
                    Some(b) => b,
                    None => {
                        self.predicate = Some(predicate);
                        panic!("{}", PoolError::LoopNotReady)
                    }
                };
                let should_run = predicate(self);
                let reschedule = if should_run {
                    body(self);
                    true
                } else {
                    false
                };
                self.predicate = Some(predicate);
                self.body = Some(body);
                reschedule
            }
        }
    }
}
