//! Error types for the worker pool and future layer

use core::fmt;

/// Result type for pool/future operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur in pool and future operations.
///
/// Mirrors the three outcome tiers of the source C API (`0` / `-1` /
/// propagated OS error code): a local recoverable failure, a propagated
/// OS error, and state violations that are specific to this runtime
/// rather than to any OS primitive.
#[derive(Debug)]
pub enum PoolError {
    /// `defer` was called after `Pool::destroy` started draining.
    ShuttingDown,

    /// A worker OS thread failed to spawn.
    SpawnFailed(std::io::Error),

    /// A signal primitive (sigaction, pthread_sigmask, sigwait, pthread_kill)
    /// returned an error that was not an expected `EINTR`.
    Signal(i32),

    /// A future's continuation was attached more than once, or `await` was
    /// called on a future that already has a continuation attached. Both
    /// are programmer errors per the exclusivity invariant of `map`.
    InvalidFutureUse(&'static str),

    /// A pool or runtime configuration value was out of range, e.g. zero
    /// workers requested.
    InvalidConfig(&'static str),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::ShuttingDown => write!(f, "pool is no longer accepting tasks"),
            PoolError::SpawnFailed(e) => write!(f, "failed to spawn worker thread: {e}"),
            PoolError::Signal(errno) => write!(f, "signal primitive failed: errno {errno}"),
            PoolError::InvalidFutureUse(msg) => write!(f, "invalid future use: {msg}"),
            PoolError::InvalidConfig(msg) => write!(f, "invalid pool configuration: {msg}"),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::SpawnFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoolError {
    fn from(e: std::io::Error) -> Self {
        PoolError::SpawnFailed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            format!("{}", PoolError::ShuttingDown),
            "pool is no longer accepting tasks"
        );
        assert_eq!(
            format!("{}", PoolError::Signal(4)),
            "signal primitive failed: errno 4"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::other("boom");
        let pool_err: PoolError = io_err.into();
        assert!(matches!(pool_err, PoolError::SpawnFailed(_)));
    }
}
