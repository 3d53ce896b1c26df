//! # taskpool
//!
//! A fixed-size worker pool with deferred tasks, single-shot futures, and
//! `map` continuation chaining, built on a blocking FIFO queue and backed
//! by a dedicated signal-handling thread that drains every live pool on
//! SIGINT.
//!
//! ## Quick Start
//!
//! ```ignore
//! use taskpool::{Pool, async_task};
//!
//! let pool = Pool::new(4).unwrap();
//!
//! // Fire-and-forget
//! pool.defer(|| println!("hello from a worker")).unwrap();
//!
//! // A future you can await
//! let future = async_task(&pool, || 6 * 7).unwrap();
//! assert_eq!(future.await_result().unwrap(), 42);
//!
//! // Chained computation
//! let doubled = async_task(&pool, || 3).unwrap()
//!     .map(&pool, |v| v * 2).unwrap();
//! assert_eq!(doubled.await_result().unwrap(), 6);
//!
//! pool.destroy();
//! ```

pub mod future;

// Re-export core types
pub use taskpool_core::{
    env_get, env_get_bool, env_get_opt, env_get_str, env_is_set, PoolError, PoolId, PoolResult,
};

// Re-export kprint macros for debug logging
pub use taskpool_core::{kdebug, kerror, kinfo, kprint, kprintln, ktrace, kwarn};
pub use taskpool_core::kprint::{
    init as init_logging, set_flush_enabled, set_log_level, set_time_enabled, LogLevel,
};

// Re-export the runtime
pub use taskpool_runtime::{BlockingQueue, Job, Pool, PoolConfig, Task};

pub use future::{async_task, Future};
