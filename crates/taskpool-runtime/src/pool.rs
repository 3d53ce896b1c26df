//! The worker pool itself.
//!
//! A fixed number of named OS threads, each popping jobs off one shared
//! blocking queue until it sees its own `Job::Stop`.
//!
//! `Pool::destroy` enqueues exactly `num_workers` stop sentinels and joins
//! every worker thread, which is what makes shutdown a *drain* rather than
//! an abort — any `Job::Run` already queued ahead of the sentinels still
//! executes.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use taskpool_core::{kdebug, PoolError, PoolId, PoolResult};

use crate::blocking_queue::BlockingQueue;
use crate::interrupt;
use crate::job::Job;
use crate::registry;

thread_local! {
    /// Which pool, if any, the current OS thread is a worker of. Lets
    /// `destroy()` recognize "I'm being called from inside one of my own
    /// workers" and skip trying to join itself.
    static CURRENT_POOL: Cell<Option<u64>> = const { Cell::new(None) };
}

fn is_worker_of(id: PoolId) -> bool {
    CURRENT_POOL.with(|cell| cell.get() == Some(id.as_u64()))
}

/// A fixed-size pool of worker threads draining a shared FIFO queue.
///
/// Cloning a `Pool` is cheap (it's an `Arc` handle); every clone refers to
/// the same set of worker threads and the same queue.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

pub struct PoolInner {
    id: PoolId,
    queue: Arc<BlockingQueue>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_workers: usize,
    destroyed: AtomicBool,
}

impl Pool {
    /// Create a pool from a [`crate::config::PoolConfig`], applying its
    /// `debug_logging` flag before spawning any worker.
    pub fn with_config(config: crate::config::PoolConfig) -> PoolResult<Pool> {
        if let Err(crate::config::ConfigError::InvalidValue(msg)) = config.validate() {
            return Err(PoolError::InvalidConfig(msg));
        }
        if config.debug_logging {
            taskpool_core::kprint::set_log_level(taskpool_core::kprint::LogLevel::Debug);
        }
        Pool::new(config.num_workers)
    }

    /// Create a new pool with `num_workers` threads, all blocked on the
    /// shared queue waiting for work.
    ///
    /// `num_workers == 0` is accepted: the pool has no workers to run
    /// anything deferred to it, and `destroy()` drains immediately
    /// (there are no sentinels to enqueue and nothing to join).
    pub fn new(num_workers: usize) -> PoolResult<Pool> {
        interrupt::ensure_installed();

        let id = PoolId::next();
        let queue = Arc::new(BlockingQueue::new());
        let mut handles = Vec::with_capacity(num_workers);

        for worker_idx in 0..num_workers {
            let queue = Arc::clone(&queue);
            let handle = std::thread::Builder::new()
                .name(format!("taskpool-{}-{}", id.as_u64(), worker_idx))
                .spawn(move || worker_loop(id, worker_idx, queue))
                .map_err(PoolError::SpawnFailed)?;
            handles.push(handle);
        }

        let inner = Arc::new(PoolInner {
            id,
            queue,
            workers: Mutex::new(handles),
            num_workers,
            destroyed: AtomicBool::new(false),
        });

        registry::register(&inner);

        Ok(Pool { inner })
    }

    /// Queue a closure for execution on the next available worker.
    /// Returns `PoolError::ShuttingDown` if `destroy` has already been
    /// called on this pool.
    pub fn defer<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.destroyed.load(Ordering::Acquire) {
            return Err(PoolError::ShuttingDown);
        }
        self.inner.queue.push(Job::Run(Box::new(f)));
        Ok(())
    }

    /// Number of worker threads owned by this pool.
    #[inline]
    pub fn num_workers(&self) -> usize {
        self.inner.num_workers
    }

    #[inline]
    pub fn id(&self) -> PoolId {
        self.inner.id
    }

    /// Stop accepting new work and wait for every queued task (including
    /// whatever was already deferred) to finish, then join every worker
    /// thread.
    ///
    /// Safe to call from inside one of the pool's own workers: in that
    /// case the calling worker's own join is skipped, since a thread can
    /// never join itself.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    #[cfg(test)]
    pub(crate) fn inner_for_test(&self) -> Arc<PoolInner> {
        Arc::clone(&self.inner)
    }
}

impl PoolInner {
    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        for _ in 0..self.num_workers {
            self.queue.push(Job::Stop);
        }

        let calling_from_own_worker = is_worker_of(self.id);
        let handles = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        for handle in handles {
            if calling_from_own_worker && handle.thread().id() == std::thread::current().id() {
                // Called from inside one of our own workers. A thread
                // can't join itself; let it finish unwinding on its own.
                continue;
            }
            let _ = handle.join();
        }
    }

    /// Invoked from the interrupt handler thread when SIGINT arrives.
    /// Identical to `destroy` except it never runs on a worker thread of
    /// this pool, so the self-join skip never applies here.
    pub(crate) fn shutdown_for_interrupt(&self) {
        kdebug!("pool {} draining for interrupt", self.id.as_u64());
        self.destroy();
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(num_workers: usize) -> Arc<PoolInner> {
        let id = PoolId::next();
        Arc::new(PoolInner {
            id,
            queue: Arc::new(BlockingQueue::new()),
            workers: Mutex::new(Vec::new()),
            num_workers,
            destroyed: AtomicBool::new(false),
        })
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // Only the last handle actually owns the threads; destroy() is
        // idempotent so calling it on every dropped clone is harmless.
        if Arc::strong_count(&self.inner) == 1 {
            self.inner.destroy();
        }
    }
}

fn worker_loop(id: PoolId, worker_idx: usize, queue: Arc<BlockingQueue>) {
    interrupt::block_in_current_thread();
    taskpool_core::kprint::set_pool_id(id.as_u64());
    taskpool_core::kprint::set_worker_id(worker_idx as u32);
    CURRENT_POOL.with(|cell| cell.set(Some(id.as_u64())));

    loop {
        match queue.pop() {
            Job::Run(task) => task(),
            Job::Stop => break,
        }
    }

    taskpool_core::kprint::clear_worker_id();
    taskpool_core::kprint::clear_pool_id();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn single_task_runs() {
        let pool = Pool::new(2).expect("pool");
        let (tx, rx) = mpsc::channel();
        pool.defer(move || tx.send(42).unwrap()).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 42);
        pool.destroy();
    }

    #[test]
    fn all_tasks_run_exactly_once() {
        let pool = Pool::new(4).expect("pool");
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..1000 {
            let counter = Arc::clone(&counter);
            pool.defer(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.destroy();
        assert_eq!(counter.load(Ordering::SeqCst), 1000);
    }

    /// spec.md §8 quantified invariant: "Task execution order on a
    /// single-worker pool equals defer order." A single worker drains
    /// the queue strictly one job at a time, so N `defer`s each
    /// appending their own index must land in the vec in `defer` order.
    #[test]
    fn single_worker_pool_executes_in_defer_order() {
        let pool = Pool::new(1).expect("pool");
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..100usize {
            let order = Arc::clone(&order);
            pool.defer(move || {
                order.lock().unwrap_or_else(|e| e.into_inner()).push(i);
            })
            .unwrap();
        }
        pool.destroy();
        let order = order.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(*order, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn defer_after_destroy_is_rejected() {
        let pool = Pool::new(1).expect("pool");
        pool.destroy();
        let err = pool.defer(|| {}).unwrap_err();
        assert!(matches!(err, PoolError::ShuttingDown));
    }

    #[test]
    fn zero_workers_drains_immediately_with_no_sentinels() {
        // spec.md §8 boundary behavior: N = 0 is a valid pool with no
        // workers and no sentinels to enqueue; destroy returns at once.
        let pool = Pool::new(0).expect("pool");
        assert_eq!(pool.num_workers(), 0);
        assert_eq!(pool.inner.queue.len(), 0);
        pool.destroy();
        assert_eq!(pool.inner.queue.len(), 0);
    }

    #[test]
    fn destroy_from_inside_a_worker_does_not_deadlock() {
        let pool = Pool::new(1).expect("pool");
        let pool_clone = pool.clone();
        let (tx, rx) = mpsc::channel();
        pool.defer(move || {
            pool_clone.destroy();
            tx.send(()).unwrap();
        })
        .unwrap();
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
    }

    /// spec.md §8 scenario 5 ("graceful interrupt"): every task queued
    /// before shutdown starts still runs to completion, it is not
    /// dropped. Exercises the same drain path the SIGINT handler thread
    /// calls (`PoolInner::shutdown_for_interrupt`) directly, so the test
    /// doesn't have to raise a real signal and race the process exiting
    /// out from under the rest of the test binary.
    #[test]
    fn interrupt_style_shutdown_drains_every_queued_task() {
        let pool = Pool::new(4).expect("pool");
        let completed = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let completed = Arc::clone(&completed);
            pool.defer(move || {
                std::thread::sleep(Duration::from_millis(10));
                completed.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        std::thread::sleep(Duration::from_millis(50));
        pool.inner.shutdown_for_interrupt();

        assert_eq!(completed.load(Ordering::SeqCst), 100);
        assert!(pool.defer(|| {}).is_err());
    }
}
