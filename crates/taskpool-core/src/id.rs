//! Pool identifier type

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a worker pool, assigned at `Pool::new()` time.
///
/// Used to tag log lines and to let the pool registry track liveness
/// without caring about insertion order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PoolId(u64);

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

impl PoolId {
    /// Sentinel meaning "not running inside any pool worker".
    pub const NONE: PoolId = PoolId(0);

    /// Allocate the next process-wide unique pool id.
    #[inline]
    pub fn next() -> Self {
        PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "PoolId(none)")
        } else {
            write!(f, "PoolId({})", self.0)
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "--")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Default for PoolId {
    fn default() -> Self {
        PoolId::NONE
    }
}
