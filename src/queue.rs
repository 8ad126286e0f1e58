//! Bounded worker pool with join-to-quiescence
//!
//! A fixed number of OS worker threads drain a FIFO task queue. The queue
//! tracks a precise pending count: a task is pending from the moment
//! [`WorkQueue::execute`] returns until the worker has finished running it,
//! successfully or not. [`WorkQueue::finish`] blocks on that counter rather
//! than on queue emptiness, so a task sitting in a worker's hands still holds
//! the caller back. A panicking task is caught and logged; the worker moves on.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// A unit of work for the pool
type Task = Box<dyn FnOnce() + Send + 'static>;

/// Shared queue state, guarded by a single mutex
#[derive(Default)]
struct State {
    /// Tasks waiting for a worker, in submission order
    tasks: VecDeque<Task>,
    /// Tasks submitted but not yet finished (queued or running)
    pending: usize,
    /// Set once by `shutdown`; workers exit after draining
    shutdown: bool,
}

/// The mutex/condvar trio the workers and the callers coordinate through
#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    /// Signalled when a task is enqueued or shutdown is requested
    work_available: Condvar,
    /// Signalled when `pending` drops to zero
    all_work_done: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Worker loop: wait for a task, run it, account for it.
    fn work(&self) {
        loop {
            let task = {
                let mut state = self.lock();
                loop {
                    if let Some(task) = state.tasks.pop_front() {
                        break task;
                    }
                    if state.shutdown {
                        return;
                    }
                    state = self
                        .work_available
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                tracing::error!("worker task panicked: {}", panic_message(&payload));
            }

            let mut state = self.lock();
            state.pending -= 1;
            if state.pending == 0 {
                self.all_work_done.notify_all();
            }
        }
    }
}

/// Fixed-size pool of worker threads draining a FIFO task queue
pub struct WorkQueue {
    inner: Arc<Inner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkQueue {
    /// Spawns a pool with the given number of workers (at least one)
    pub fn new(threads: usize) -> Self {
        let inner = Arc::new(Inner::default());

        let workers = (0..threads.max(1))
            .map(|id| {
                let inner = Arc::clone(&inner);
                std::thread::Builder::new()
                    .name(format!("worker-{id}"))
                    .spawn(move || inner.work())
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            inner,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueues a task; never blocks and never rejects while the pool is
    /// running.
    ///
    /// # Panics
    ///
    /// Panics if called after [`shutdown`](Self::shutdown); that is a
    /// programming error, not a runtime condition.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.lock();
        assert!(!state.shutdown, "execute called after shutdown");
        state.tasks.push_back(Box::new(task));
        state.pending += 1;
        self.inner.work_available.notify_one();
    }

    /// Blocks until every previously executed task has run to completion or
    /// panicked. The pool stays usable afterwards.
    pub fn finish(&self) {
        let mut state = self.inner.lock();
        while state.pending > 0 {
            state = self
                .inner
                .all_work_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Signals the workers to exit once the queue drains. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        state.shutdown = true;
        self.inner.work_available.notify_all();
    }

    /// Waits for the worker threads to terminate. Call after
    /// [`shutdown`](Self::shutdown).
    pub fn join(&self) {
        let handles: Vec<_> = {
            let mut workers = self
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            workers.drain(..).collect()
        };
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("worker thread terminated abnormally");
            }
        }
    }

    /// Number of tasks submitted but not yet finished
    pub fn pending(&self) -> usize {
        self.inner.lock().pending
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}

/// Best-effort rendition of a panic payload for the log
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
