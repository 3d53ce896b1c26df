//! The unit of work a pool queue carries.
//!
//! A worker pulling a `Job::Stop` off the queue does not mean "the pool is
//! empty" — it means "this worker should exit". `Pool::destroy` enqueues
//! exactly one `Stop` per worker so every worker sees its own sentinel
//! after draining whatever real work precedes it in the queue.

/// A boxed, type-erased unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub enum Job {
    /// Run this closure on a worker thread.
    Run(Task),
    /// Exit the worker loop. One `Stop` is consumed by exactly one worker.
    Stop,
}

impl Job {
    #[inline]
    pub fn is_stop(&self) -> bool {
        matches!(self, Job::Stop)
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Run(_) => f.write_str("Job::Run(..)"),
            Job::Stop => f.write_str("Job::Stop"),
        }
    }
}
