//! System allocator adapter.
//!
//! The single place the pool touches the host environment: large requests
//! and arena growth go through [`SystemAlloc`], everything else is served
//! from pool-owned memory. The adapter carries no state and no policy.

use std::ptr::NonNull;

/// Raw acquire/release seam over the host allocator.
///
/// Takes `&mut self` so instrumented implementations (call counters,
/// failure injection) can be written without interior mutability.
pub trait SystemAlloc {
    /// Acquires `n` bytes, or `None` when the host refuses.
    fn acquire(&mut self, n: usize) -> Option<NonNull<u8>>;

    /// Releases a block previously returned by [`SystemAlloc::acquire`].
    ///
    /// `n` is the size passed to the acquiring call. The default adapter
    /// ignores it; adapters with their own bookkeeping may not.
    fn release(&mut self, ptr: NonNull<u8>, n: usize);
}

/// Pass-through adapter over `libc::malloc` / `libc::free`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostAlloc;

impl SystemAlloc for HostAlloc {
    fn acquire(&mut self, n: usize) -> Option<NonNull<u8>> {
        // SAFETY: malloc has no preconditions for a nonzero size; a null
        // return maps to None.
        let raw = unsafe { libc::malloc(n.max(1)) };
        NonNull::new(raw.cast::<u8>())
    }

    fn release(&mut self, ptr: NonNull<u8>, _n: usize) {
        // SAFETY: `ptr` came from `acquire`, i.e. from malloc, and is
        // released exactly once by contract.
        unsafe { libc::free(ptr.as_ptr().cast::<libc::c_void>()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_roundtrip() {
        let mut host = HostAlloc;
        let block = host.acquire(64).expect("host allocation");
        // SAFETY: the block is 64 bytes, freshly acquired, exclusively ours.
        unsafe {
            block.as_ptr().write_bytes(0xAB, 64);
            assert_eq!(*block.as_ptr().add(63), 0xAB);
        }
        host.release(block, 64);
    }

    #[test]
    fn test_acquire_zero_clamps() {
        let mut host = HostAlloc;
        let block = host.acquire(0).expect("zero-size acquire");
        host.release(block, 0);
    }
}
