//! # taskpool-core
//!
//! Platform-agnostic types shared by the worker pool and future layer.
//!
//! This crate has no threads and no OS calls. Everything that touches an
//! OS thread, a signal, or a mutex lives in `taskpool-runtime`.
//!
//! ## Modules
//!
//! - `id` - pool identifier type
//! - `error` - error types
//! - `spinlock` - internal spinlock used for short critical sections
//! - `kprint` - kernel-style debug printing macros
//! - `env` - environment variable utilities

#![allow(dead_code)]

pub mod env;
pub mod error;
pub mod id;
pub mod kprint;
pub mod spinlock;

pub use env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};
pub use error::{PoolError, PoolResult};
pub use id::PoolId;
pub use spinlock::SpinLock;

/// Process-wide limits.
pub mod constants {
    /// Maximum number of worker threads a single pool may own.
    ///
    /// Not enforced as a hard error — `Pool::new` simply won't be asked
    /// to spawn more than this in any test or demo — but it keeps the
    /// thread-local worker-id bookkeeping bounded.
    pub const MAX_WORKERS_PER_POOL: usize = 1024;
}
