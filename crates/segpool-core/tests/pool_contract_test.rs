//! Contract tests for the pool's observable behavior: routing between the
//! free lists and the system adapter, batch refill, arena growth, the
//! scavenge fallback, and exhaustion.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use segpool_core::{
    HostAlloc, MAX_SMALL_SIZE, OutOfMemory, Pool, REFILL_BATCH, SystemAlloc,
};

/// Adapter recording the size of every acquisition. The log is shared so
/// the test keeps a handle while the pool owns the adapter.
#[derive(Default)]
struct CountingSystem {
    host: HostAlloc,
    acquires: Rc<RefCell<Vec<usize>>>,
}

impl SystemAlloc for CountingSystem {
    fn acquire(&mut self, n: usize) -> Option<NonNull<u8>> {
        self.acquires.borrow_mut().push(n);
        self.host.acquire(n)
    }

    fn release(&mut self, ptr: NonNull<u8>, n: usize) {
        self.host.release(ptr, n);
    }
}

/// Adapter that serves a fixed number of acquisitions, then refuses.
struct BudgetedSystem {
    host: HostAlloc,
    budget: usize,
}

impl BudgetedSystem {
    fn new(budget: usize) -> Self {
        Self {
            host: HostAlloc,
            budget,
        }
    }
}

impl SystemAlloc for BudgetedSystem {
    fn acquire(&mut self, n: usize) -> Option<NonNull<u8>> {
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        self.host.acquire(n)
    }

    fn release(&mut self, ptr: NonNull<u8>, n: usize) {
        self.host.release(ptr, n);
    }
}

#[test]
fn round_trip_every_served_size() {
    let mut pool = Pool::new();
    for size in 1..=MAX_SMALL_SIZE {
        let block = pool.allocate(size).unwrap();
        let fill = (size % 251) as u8;
        // SAFETY: the block is at least `size` bytes and exclusively ours.
        unsafe {
            block.as_ptr().write_bytes(fill, size);
            assert_eq!(*block.as_ptr(), fill);
            assert_eq!(*block.as_ptr().add(size - 1), fill);
        }
        pool.deallocate(block, size);
    }
}

#[test]
fn reuse_is_lifo_per_class() {
    let mut pool = Pool::new();
    let first = pool.allocate(40).unwrap();
    let second = pool.allocate(40).unwrap();
    pool.deallocate(first, 40);
    pool.deallocate(second, 40);
    // Most recently freed comes back first.
    assert_eq!(pool.allocate(40).unwrap(), second);
    assert_eq!(pool.allocate(40).unwrap(), first);
}

#[test]
fn boundary_routes_to_different_components() {
    let system = CountingSystem::default();
    let acquires = Rc::clone(&system.acquires);
    let mut pool = Pool::with_system(system);

    let small = pool.allocate(MAX_SMALL_SIZE).unwrap();
    // The small side asked the adapter for a whole growth region, not the
    // request size.
    assert_eq!(pool.stats().arena_grows, 1);
    assert_eq!(pool.stats().large_acquires, 0);

    let large = pool.allocate(MAX_SMALL_SIZE + 1).unwrap();
    assert_eq!(pool.stats().large_acquires, 1);

    pool.deallocate(small, MAX_SMALL_SIZE);
    pool.deallocate(large, MAX_SMALL_SIZE + 1);

    // First acquisition was the arena growth (2 * 128 * batch), the second
    // the verbatim large request.
    let sizes = acquires.borrow();
    assert_eq!(sizes.len(), 2);
    assert_eq!(sizes[0], 2 * MAX_SMALL_SIZE * REFILL_BATCH);
    assert_eq!(sizes[1], MAX_SMALL_SIZE + 1);
    assert_eq!(
        pool.events()
            .iter()
            .filter(|e| matches!(e, segpool_core::PoolEvent::LargeAlloc { .. }))
            .count(),
        1
    );
}

#[test]
fn batch_refill_caches_subsequent_allocations() {
    let mut pool = Pool::new();

    let mut blocks = vec![pool.allocate(32).unwrap()];
    assert_eq!(pool.stats().refills, 1);
    assert_eq!(pool.stats().arena_grows, 1);

    // Calls 2..=10 are served from the threaded batch.
    for _ in 1..10 {
        blocks.push(pool.allocate(32).unwrap());
    }
    assert_eq!(pool.stats().refills, 1);
    assert_eq!(pool.stats().arena_grows, 1);
    assert_eq!(pool.free_blocks(3), REFILL_BATCH - 10);

    for block in blocks {
        pool.deallocate(block, 32);
    }
}

#[test]
fn growth_is_monotonic_and_pointers_stay_valid() {
    let mut pool = Pool::new();

    // Fill a first region and stamp every block.
    let mut blocks = Vec::new();
    for i in 0..REFILL_BATCH {
        let block = pool.allocate(64).unwrap();
        // SAFETY: 64-byte block, exclusively ours.
        unsafe { block.as_ptr().write_bytes(i as u8, 64) };
        blocks.push(block);
    }
    let heap_before = pool.heap_size();
    assert!(heap_before > 0);

    // Keep allocating until the arena must grow again.
    let mut more = Vec::new();
    while pool.heap_size() == heap_before {
        more.push(pool.allocate(64).unwrap());
    }
    assert!(pool.heap_size() > heap_before);

    // Earlier blocks were never moved.
    for (i, block) in blocks.iter().enumerate() {
        // SAFETY: still live, still 64 bytes.
        unsafe {
            assert_eq!(*block.as_ptr(), i as u8);
            assert_eq!(*block.as_ptr().add(63), i as u8);
        }
    }

    for block in blocks.into_iter().chain(more) {
        pool.deallocate(block, 64);
    }
}

#[test]
fn scavenge_steals_from_larger_class() {
    // One acquisition only: afterwards the pool lives off what it has.
    let mut pool = Pool::with_system(BudgetedSystem::new(1));

    // Grow once: 2 * 8 * 20 = 320 bytes; 160 carved for the batch.
    let a = pool.allocate(8).unwrap();
    assert_eq!(pool.stats().arena_grows, 1);

    // 160 bytes left serve exactly one 128-byte block, returned directly.
    let b = pool.allocate(128).unwrap();
    assert_eq!(pool.free_blocks(15), 0);
    pool.deallocate(b, 128);
    assert_eq!(pool.free_blocks(15), 1);

    // 32 bytes of arena left: a 48-byte request must donate the remainder,
    // fail to grow, and scavenge the parked 128-byte block.
    let c = pool.allocate(48).unwrap();
    assert_eq!(c, b);
    assert_eq!(pool.stats().scavenges, 1);
    assert_eq!(pool.stats().remainders_donated, 1);
    // Donated remainder landed in the 32-byte class...
    assert_eq!(pool.free_blocks(3), 1);
    // ...and the scavenged region yielded one spare 48-byte block.
    assert_eq!(pool.free_blocks(5), 1);

    // SAFETY: `c` is a live 48-byte block.
    unsafe {
        c.as_ptr().write_bytes(0xC3, 48);
        assert_eq!(*c.as_ptr().add(47), 0xC3);
    }

    pool.deallocate(a, 8);
    pool.deallocate(c, 48);
}

#[test]
fn exhaustion_reports_out_of_memory() {
    let mut pool = Pool::with_system(BudgetedSystem::new(0));
    assert_eq!(pool.allocate(16), Err(OutOfMemory { requested: 16 }));
    assert_eq!(pool.allocate(4096), Err(OutOfMemory { requested: 4096 }));
    assert_eq!(pool.stats().ooms, 2);
}

#[test]
fn exhaustion_after_scavenging_everything() {
    let mut pool = Pool::with_system(BudgetedSystem::new(1));

    let a = pool.allocate(8).unwrap();
    let b = pool.allocate(128).unwrap();
    pool.deallocate(b, 128);
    let c = pool.allocate(48).unwrap();

    // The only block of class 15 was scavenged above; another 128-byte
    // request finds nothing at or above its class and fails.
    let err = pool.allocate(128).unwrap_err();
    assert_eq!(err.requested, 128);
    assert_eq!(pool.stats().ooms, 1);

    // The failure is isolated: smaller classes still serve.
    let d = pool.allocate(48).unwrap();
    pool.deallocate(a, 8);
    pool.deallocate(c, 48);
    pool.deallocate(d, 48);
}
