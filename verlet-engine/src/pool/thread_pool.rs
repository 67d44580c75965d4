// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Fixed-size worker thread pool
//!
//! Workers are spawned once and live as long as the pool. Each one spins on
//! a shared task queue, yielding between polls, so picking up a batch costs
//! no syscall. `dispatch` splits a range into one batch per worker, runs any
//! remainder on the calling thread, then spins until the remaining-task
//! counter drains. Spinning burns CPU while idle; in exchange a per-frame
//! parallel-for has very little start-up latency.
//!
//! A panicking task is fatal: the worker logs the panic and aborts the
//! process. Physics kernels are not expected to fail.
//!
//! `dispatch` called from one of the pool's own workers runs the whole
//! range inline on that worker, since waiting for queued batches there
//! would wait on the calling task itself.

use super::{RangeDispatcher, RangeTask};
use crate::error::PoolError;
use log::{debug, error};
use std::cell::Cell;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    /// Address of the `Shared` state of the pool this thread works for, or 0
    static WORKER_OF: Cell<usize> = const { Cell::new(0) };
}

/// Configuration for a `ThreadPool`
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads to spawn
    pub worker_count: usize,
    /// Prefix for worker thread names; the worker index is appended
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            worker_count: thread::available_parallelism().map_or(1, |n| n.get()),
            thread_name_prefix: "verlet-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the given worker count
    pub fn new(worker_count: usize) -> Self {
        PoolConfig {
            worker_count,
            ..PoolConfig::default()
        }
    }

    /// Set the prefix used for worker thread names
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

/// Counters for monitoring pool activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Tasks completed by worker threads
    pub tasks_executed: u64,
    /// Completed `dispatch` calls
    pub dispatches: u64,
}

struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    remaining: AtomicUsize,
}

impl TaskQueue {
    fn new() -> Self {
        TaskQueue {
            tasks: Mutex::new(VecDeque::new()),
            remaining: AtomicUsize::new(0),
        }
    }

    fn push(&self, task: Task) {
        // Count before publishing so a fast worker can never decrement first
        self.remaining.fetch_add(1, Ordering::AcqRel);
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }

    fn pop(&self) -> Option<Task> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn work_done(&self) {
        self.remaining.fetch_sub(1, Ordering::AcqRel);
    }

    fn wait_for_completion(&self) {
        while self.remaining.load(Ordering::Acquire) > 0 {
            thread::yield_now();
        }
    }
}

struct Shared {
    queue: TaskQueue,
    running: AtomicBool,
    tasks_executed: AtomicU64,
    dispatches: AtomicU64,
}

/// Fixed set of worker threads consuming a shared task queue
///
/// # Examples
///
/// ```
/// use verlet_engine::pool::{RangeDispatcher, ThreadPool};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let pool = ThreadPool::new(4).unwrap();
/// let sum = AtomicUsize::new(0);
/// pool.dispatch(1000, &|start, end| {
///     sum.fetch_add((start..end).sum::<usize>(), Ordering::Relaxed);
/// });
/// assert_eq!(sum.load(Ordering::Relaxed), 499_500);
/// ```
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Start a pool with `worker_count` workers
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        Self::with_config(PoolConfig::new(worker_count))
    }

    /// Start a pool from a configuration
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        if config.worker_count == 0 {
            return Err(PoolError::ZeroWorkers);
        }

        let mut pool = ThreadPool {
            shared: Arc::new(Shared {
                queue: TaskQueue::new(),
                running: AtomicBool::new(true),
                tasks_executed: AtomicU64::new(0),
                dispatches: AtomicU64::new(0),
            }),
            workers: Vec::with_capacity(config.worker_count),
        };

        for index in 0..config.worker_count {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, index))
                .spawn(move || worker_loop(&shared))
                // Dropping `pool` on error stops the workers already started
                .map_err(|source| PoolError::Spawn { index, source })?;
            pool.workers.push(handle);
        }

        debug!("Started thread pool with {} workers", config.worker_count);
        Ok(pool)
    }

    /// Queue a task for any worker
    ///
    /// Callable from any thread. Use `wait_for_completion` to block until
    /// it has run. A task must not call `wait_for_completion` on its own
    /// pool: the wait includes the task itself and never returns.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.queue.push(Box::new(task));
    }

    /// Spin until every queued task has completed
    ///
    /// Deadlocks if called from a task running on this pool.
    pub fn wait_for_completion(&self) {
        self.shared.queue.wait_for_completion();
    }

    /// Get a snapshot of the pool counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            tasks_executed: self.shared.tasks_executed.load(Ordering::Relaxed),
            dispatches: self.shared.dispatches.load(Ordering::Relaxed),
        }
    }

    /// Check whether the current thread is one of this pool's workers
    pub fn is_worker_thread(&self) -> bool {
        WORKER_OF.with(|owner| owner.get() == self.shared_addr())
    }

    fn shared_addr(&self) -> usize {
        Arc::as_ptr(&self.shared) as usize
    }
}

impl RangeDispatcher for ThreadPool {
    fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn dispatch(&self, element_count: usize, task: RangeTask<'_>) {
        if self.is_worker_thread() {
            if element_count > 0 {
                task(0, element_count);
            }
            self.shared.dispatches.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let workers = self.workers.len();
        let batch_size = element_count / workers;

        if batch_size > 0 {
            for i in 0..workers {
                let start = batch_size * i;
                let end = start + batch_size;
                let job: Box<dyn FnOnce() + Send + '_> = Box::new(move || task(start, end));
                // SAFETY: `job` borrows `task`, which outlives this call. We do
                // not return (or unwind) before `wait_for_completion` has seen
                // every queued job finish, and a panicking job aborts the
                // process instead of unwinding past the borrow.
                let job: Task = unsafe {
                    std::mem::transmute::<Box<dyn FnOnce() + Send + '_>, Task>(job)
                };
                self.shared.queue.push(job);
            }
        }

        let covered = batch_size * workers;
        let remainder = if covered < element_count {
            panic::catch_unwind(AssertUnwindSafe(|| task(covered, element_count)))
        } else {
            Ok(())
        };

        self.shared.queue.wait_for_completion();
        self.shared.dispatches.fetch_add(1, Ordering::Relaxed);

        if let Err(payload) = remainder {
            panic::resume_unwind(payload);
        }
    }

    fn name(&self) -> &str {
        "ThreadPool"
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.queue.wait_for_completion();
        self.shared.running.store(false, Ordering::Release);
        for handle in self.workers.drain(..) {
            // Workers abort on task panics, so join only fails if the
            // thread was torn down externally; nothing left to clean up.
            let _ = handle.join();
        }
        debug!("Stopped thread pool");
    }
}

fn worker_loop(shared: &Shared) {
    WORKER_OF.with(|owner| owner.set(shared as *const Shared as usize));
    while shared.running.load(Ordering::Acquire) {
        match shared.queue.pop() {
            Some(task) => {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                    error!(
                        "Worker task panicked, aborting: {}",
                        panic_message(payload.as_ref())
                    );
                    std::process::abort();
                }
                shared.tasks_executed.fetch_add(1, Ordering::Relaxed);
                shared.queue.work_done();
            }
            None => thread::yield_now(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
