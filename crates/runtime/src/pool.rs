//! Fixed-size worker pool.
//!
//! Workers pull boxed jobs from one shared queue guarded by a mutex and a
//! condition variable. `submit` returns a [`TaskHandle`] that resolves to the
//! job's return value, or to an error if the job panicked. Shutdown stops
//! intake, lets queued jobs drain and joins every worker, so every handle
//! handed out before shutdown resolves.

use crate::error::{Result, RuntimeError};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
}

/// A fixed set of worker threads consuming a shared task queue.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("queued", &state.jobs.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl WorkerPool {
    /// Starts `size` workers (minimum 1).
    pub fn new(size: usize) -> Result<Self> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        });

        let mut pool = WorkerPool {
            shared,
            workers: Vec::with_capacity(size),
        };
        for index in 0..size {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("tally-worker-{}", index))
                .spawn(move || worker_loop(index, shared))
                .map_err(|source| RuntimeError::Spawn { index, source })?;
            pool.workers.push(handle);
        }
        log::debug!("started worker pool with {} threads", size);
        Ok(pool)
    }

    /// Number of worker threads.
    #[inline]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Number of jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }

    /// Returns true once shutdown has begun.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Queues `task` and returns a handle to its result.
    ///
    /// Fails with [`RuntimeError::PoolClosed`] after shutdown has begun.
    pub fn submit<F, R>(&self, task: F) -> Result<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let slot = Arc::new(Slot::new());
        let promise = Promise {
            slot: Some(Arc::clone(&slot)),
        };
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                log::warn!("task panicked: {}", message);
                RuntimeError::TaskPanicked { message }
            });
            promise.fulfil(outcome);
        });

        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(RuntimeError::PoolClosed);
            }
            state.jobs.push_back(job);
        }
        self.shared.available.notify_one();
        Ok(TaskHandle { slot })
    }

    /// Stops intake, drains queued jobs and joins every worker.
    pub fn shutdown(&mut self) {
        self.shared.state.lock().closed = true;
        self.shared.available.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(index: usize, shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    break job;
                }
                if state.closed {
                    log::trace!("worker {} exiting", index);
                    return;
                }
                shared.available.wait(&mut state);
            }
        };
        job();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

struct Slot<R> {
    result: Mutex<Option<Result<R>>>,
    done: Condvar,
}

impl<R> Slot<R> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, outcome: Result<R>) {
        *self.result.lock() = Some(outcome);
        self.done.notify_all();
    }
}

/// Write side of a task result. Resolves the handle with
/// [`RuntimeError::TaskDropped`] if the job is dropped unrun.
struct Promise<R> {
    slot: Option<Arc<Slot<R>>>,
}

impl<R> Promise<R> {
    fn fulfil(mut self, outcome: Result<R>) {
        if let Some(slot) = self.slot.take() {
            slot.complete(outcome);
        }
    }
}

impl<R> Drop for Promise<R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.complete(Err(RuntimeError::TaskDropped));
        }
    }
}

/// Read side of a submitted task.
pub struct TaskHandle<R> {
    slot: Arc<Slot<R>>,
}

impl<R> std::fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl<R> TaskHandle<R> {
    /// Returns true once the task has produced a result.
    pub fn is_finished(&self) -> bool {
        self.slot.result.lock().is_some()
    }

    /// Blocks until the task finishes and returns its result.
    pub fn wait(self) -> Result<R> {
        let mut result = self.slot.result.lock();
        loop {
            if let Some(outcome) = result.take() {
                return outcome;
            }
            self.slot.done.wait(&mut result);
        }
    }
}
