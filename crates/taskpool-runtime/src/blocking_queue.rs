//! The queue workers block on when there is nothing to do.
//!
//! A deque guarded by a lock, with waiters parked until something is
//! pushed. A `Condvar` plus an `AtomicUsize` length stand in for a
//! counting semaphore: a push always notifies exactly one waiter, and a
//! popping worker re-checks the length itself rather than trusting the
//! wakeup alone, which is the usual condvar spurious-wakeup discipline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

use crate::fifo::Fifo;
use crate::job::Job;

pub struct BlockingQueue {
    fifo: Mutex<Fifo>,
    not_empty: Condvar,
    len: AtomicUsize,
}

impl BlockingQueue {
    pub fn new() -> Self {
        BlockingQueue {
            fifo: Mutex::new(Fifo::new()),
            not_empty: Condvar::new(),
            len: AtomicUsize::new(0),
        }
    }

    /// Push a job to the back and wake exactly one waiting worker.
    pub fn push(&self, job: Job) {
        let mut fifo = self.fifo.lock().unwrap_or_else(|e| e.into_inner());
        fifo.push_back(job);
        self.len.fetch_add(1, Ordering::SeqCst);
        drop(fifo);
        self.not_empty.notify_one();
    }

    /// Pop the next job, blocking until one is available.
    pub fn pop(&self) -> Job {
        let mut fifo = self.fifo.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(job) = fifo.pop_front() {
                self.len.fetch_sub(1, Ordering::SeqCst);
                return job;
            }
            fifo = self
                .not_empty
                .wait(fifo)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Best-effort length snapshot. Racy by nature: useful for tests and
    /// debug logging, not for correctness decisions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BlockingQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn pop_blocks_until_pushed() {
        let q = Arc::new(BlockingQueue::new());
        let q2 = Arc::clone(&q);

        let handle = thread::spawn(move || q2.pop());

        thread::sleep(Duration::from_millis(50));
        q.push(Job::Run(Box::new(|| {})));

        let job = handle.join().unwrap();
        assert!(!job.is_stop());
    }

    #[test]
    fn fifo_order_preserved_across_threads() {
        let q = Arc::new(BlockingQueue::new());
        for i in 0..5u32 {
            let order = Arc::new(std::sync::Mutex::new(Vec::new()));
            let order2 = Arc::clone(&order);
            let i = i;
            q.push(Job::Run(Box::new(move || {
                order2.lock().unwrap().push(i);
            })));
        }
        assert_eq!(q.len(), 5);
        for expected in 0..5u32 {
            match q.pop() {
                Job::Run(f) => {
                    let _ = expected;
                    f();
                }
                Job::Stop => panic!("unexpected stop"),
            }
        }
        assert!(q.is_empty());
    }
}
