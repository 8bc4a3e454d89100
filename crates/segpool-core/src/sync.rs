//! Mutex-guarded pool.
//!
//! The core [`Pool`] is single-threaded: free-list push/pop and the arena
//! bump are unprotected read-modify-write sequences. `LockedPool` wraps a
//! pool in a `parking_lot::Mutex` for embedders that want to share one
//! pool across threads, paying one lock per operation.

use std::ptr::NonNull;

use parking_lot::Mutex;

use crate::error::OutOfMemory;
use crate::pool::Pool;
use crate::stats::StatsSnapshot;
use crate::system::{HostAlloc, SystemAlloc};

/// A [`Pool`] behind a mutex.
pub struct LockedPool<S: SystemAlloc = HostAlloc> {
    inner: Mutex<Pool<S>>,
}

// SAFETY: the raw pointers inside the pool only reference memory the pool
// owns, and every access goes through the mutex.
unsafe impl<S: SystemAlloc + Send> Send for LockedPool<S> {}
// SAFETY: as above; the mutex serializes all mutation.
unsafe impl<S: SystemAlloc + Send> Sync for LockedPool<S> {}

impl LockedPool<HostAlloc> {
    /// Creates a locked pool backed by the host allocator.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Pool::new()),
        }
    }
}

impl Default for LockedPool<HostAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SystemAlloc> LockedPool<S> {
    /// Creates a locked pool over a caller-supplied system adapter.
    pub fn with_system(system: S) -> Self {
        Self {
            inner: Mutex::new(Pool::with_system(system)),
        }
    }

    /// See [`Pool::allocate`].
    pub fn allocate(&self, n: usize) -> Result<NonNull<u8>, OutOfMemory> {
        self.inner.lock().allocate(n)
    }

    /// See [`Pool::deallocate`]; the same size contract applies.
    pub fn deallocate(&self, ptr: NonNull<u8>, n: usize) {
        self.inner.lock().deallocate(ptr, n)
    }

    /// See [`Pool::reallocate`].
    pub fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_n: usize,
        new_n: usize,
    ) -> Result<NonNull<u8>, OutOfMemory> {
        self.inner.lock().reallocate(ptr, old_n, new_n)
    }

    /// Point-in-time stats view.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_roundtrip() {
        let pool = LockedPool::new();
        let block = pool.allocate(32).unwrap();
        pool.deallocate(block, 32);
        assert_eq!(pool.snapshot().stats.refills, 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let pool = LockedPool::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        let block = pool.allocate(48).unwrap();
                        // SAFETY: the block is ours until deallocated.
                        unsafe { block.as_ptr().write(1) };
                        pool.deallocate(block, 48);
                    }
                });
            }
        });
        let snapshot = pool.snapshot();
        assert!(snapshot.stats.refills >= 1);
        assert_eq!(snapshot.stats.ooms, 0);
    }
}
