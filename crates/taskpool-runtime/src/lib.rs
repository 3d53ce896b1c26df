//! # taskpool-runtime
//!
//! The OS-facing half of the worker pool: thread spawning, the blocking
//! job queue, and the dedicated SIGINT handler thread that drains every
//! live pool on interrupt.
//!
//! Everything platform-agnostic (ids, errors, debug printing) lives in
//! `taskpool-core`; this crate is the part that actually talks to the OS.

#![allow(dead_code)]

pub mod blocking_queue;
pub mod config;
pub mod fifo;
pub mod interrupt;
pub mod job;
pub mod pool;
pub mod registry;

pub use blocking_queue::BlockingQueue;
pub use config::PoolConfig;
pub use job::{Job, Task};
pub use pool::Pool;
