//! The segregated free-list pool.
//!
//! Small requests (at most [`MAX_SMALL_SIZE`] bytes) are rounded up to a
//! size class and served LIFO from that class's free list. A miss pulls a
//! batch of blocks out of the bump arena; when the arena runs dry it grows
//! through the system adapter, donating any leftover fragment to the
//! matching free list, and falls back to scavenging a spare block from a
//! larger class before reporting [`OutOfMemory`]. Requests above the
//! ceiling bypass the pool entirely.
//!
//! `Pool` is a value, not a global: independent pools coexist, and every
//! arena region goes back to the adapter when the pool drops. The type is
//! single-threaded by construction; see [`crate::sync::LockedPool`] for
//! the mutex-guarded variant.

use std::ptr::NonNull;

use crate::arena::Arena;
use crate::error::OutOfMemory;
use crate::free_list::FreeList;
use crate::size_class::{self, MAX_SMALL_SIZE, NUM_SIZE_CLASSES, REFILL_BATCH};
use crate::stats::{PoolEvent, PoolStats, StatsSnapshot};
use crate::system::{HostAlloc, SystemAlloc};

/// Segregated free-list allocator over a pluggable system adapter.
pub struct Pool<S: SystemAlloc = HostAlloc> {
    /// One free list per size class.
    lists: [FreeList; NUM_SIZE_CLASSES],
    arena: Arena,
    system: S,
    /// Every region acquired from the system for the arena, handed back on
    /// drop. Large pass-through blocks are not recorded; callers own them.
    chunks: Vec<(NonNull<u8>, usize)>,
    stats: PoolStats,
    events: Vec<PoolEvent>,
}

impl Pool<HostAlloc> {
    /// Creates a pool backed by the host allocator.
    pub fn new() -> Self {
        Self::with_system(HostAlloc)
    }
}

impl Default for Pool<HostAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SystemAlloc> Pool<S> {
    /// Creates a pool over a caller-supplied system adapter.
    pub fn with_system(system: S) -> Self {
        Self {
            lists: std::array::from_fn(|_| FreeList::new()),
            arena: Arena::new(),
            system,
            chunks: Vec::new(),
            stats: PoolStats::default(),
            events: Vec::new(),
        }
    }

    /// Allocates `n` bytes. Zero-size requests are served as one byte.
    pub fn allocate(&mut self, n: usize) -> Result<NonNull<u8>, OutOfMemory> {
        let n = n.max(1);
        if n > MAX_SMALL_SIZE {
            return self.allocate_large(n);
        }
        let class = size_class::class_index(n);
        if let Some(block) = self.lists[class].pop() {
            return Ok(block);
        }
        self.refill(size_class::round_up(n))
            .map_err(|_| OutOfMemory { requested: n })
    }

    /// Returns a block to the pool.
    ///
    /// `n` must equal the size passed to the allocating call. The pool
    /// keeps no per-block size records: a mismatched `n` files the block
    /// under the wrong class and silently corrupts that list.
    pub fn deallocate(&mut self, ptr: NonNull<u8>, n: usize) {
        let n = n.max(1);
        if n > MAX_SMALL_SIZE {
            self.system.release(ptr, n);
            self.stats.large_releases += 1;
            self.events.push(PoolEvent::LargeFree { bytes: n });
            return;
        }
        let class = size_class::class_index(n);
        // SAFETY: the caller returns exclusive ownership of a block of at
        // least `class_size(class)` aligned bytes.
        unsafe { self.lists[class].push(ptr) };
    }

    /// Resizes an allocation.
    ///
    /// A resize within one size class returns `ptr` unchanged with its
    /// contents intact. Across classes the new block is allocated before
    /// the old one is released, so a failed resize leaves the original
    /// block valid; contents are not carried over, and `old_n` must match
    /// the allocating call like in [`Pool::deallocate`].
    pub fn reallocate(
        &mut self,
        ptr: NonNull<u8>,
        old_n: usize,
        new_n: usize,
    ) -> Result<NonNull<u8>, OutOfMemory> {
        let old_n = old_n.max(1);
        let new_n = new_n.max(1);
        if old_n <= MAX_SMALL_SIZE
            && new_n <= MAX_SMALL_SIZE
            && size_class::class_index(old_n) == size_class::class_index(new_n)
        {
            return Ok(ptr);
        }
        let fresh = self.allocate(new_n)?;
        self.deallocate(ptr, old_n);
        Ok(fresh)
    }

    fn allocate_large(&mut self, n: usize) -> Result<NonNull<u8>, OutOfMemory> {
        let Some(block) = self.system.acquire(n) else {
            self.stats.ooms += 1;
            self.events.push(PoolEvent::Oom { requested: n });
            return Err(OutOfMemory { requested: n });
        };
        self.stats.large_acquires += 1;
        self.events.push(PoolEvent::LargeAlloc { bytes: n });
        Ok(block)
    }

    /// Serves a miss on the `block_size` class: pulls up to
    /// [`REFILL_BATCH`] blocks from the arena, hands the first to the
    /// caller, and threads the rest onto the class's list. A single-block
    /// batch never touches the list.
    fn refill(&mut self, block_size: usize) -> Result<NonNull<u8>, OutOfMemory> {
        let class = size_class::class_index(block_size);
        let (span, count) = self.chunk_alloc(block_size, REFILL_BATCH)?;
        self.stats.refills += 1;
        self.events.push(PoolEvent::Refill {
            class,
            blocks: count,
        });
        if count > 1 {
            // SAFETY: blocks 1..count of the span are unowned and exactly
            // `block_size` bytes apart.
            unsafe {
                let rest = NonNull::new_unchecked(span.as_ptr().add(block_size));
                self.lists[class].push_span(rest, block_size, count - 1);
            }
        }
        Ok(span)
    }

    /// Carves a span of up to `want` blocks of `block_size` bytes out of
    /// the arena, growing or scavenging when the arena runs dry.
    ///
    /// Bounded loop: an iteration either returns a span or strictly adds
    /// arena capacity (fresh system memory, or one scavenged block of at
    /// least `block_size` bytes), so the iteration after an adoption
    /// always carves. Only total exhaustion is reported; partial carves
    /// and scavenges are silent.
    fn chunk_alloc(
        &mut self,
        block_size: usize,
        want: usize,
    ) -> Result<(NonNull<u8>, usize), OutOfMemory> {
        loop {
            if let Some(span) = self.arena.carve(block_size, want) {
                return Ok(span);
            }
            // Sub-block remainder: file it under its exact class rather
            // than lose it. Always a multiple of ALIGNMENT, since every
            // adopted region and every carve is.
            if let Some((leftover, len)) = self.arena.take_remainder() {
                let class = size_class::class_index(len);
                // SAFETY: the remainder is detached from the arena and is
                // exactly `class_size(class)` bytes.
                unsafe { self.lists[class].push(leftover) };
                self.stats.remainders_donated += 1;
                self.events.push(PoolEvent::RemainderDonated { class, bytes: len });
            }
            let grow = self.arena.growth_request(block_size, want);
            if let Some(region) = self.system.acquire(grow) {
                self.chunks.push((region, grow));
                self.arena.adopt(region, grow);
                self.arena.record_growth(grow);
                self.stats.arena_grows += 1;
                self.events.push(PoolEvent::ArenaGrow { bytes: grow });
                continue;
            }
            if self.scavenge(block_size) {
                continue;
            }
            self.stats.ooms += 1;
            self.events.push(PoolEvent::Oom {
                requested: block_size,
            });
            return Err(OutOfMemory {
                requested: block_size,
            });
        }
    }

    /// Steals one free block from the smallest class of at least
    /// `block_size` bytes and adopts it as the new arena region.
    ///
    /// Stolen capacity never migrates back to the victim class, which can
    /// starve larger classes under adversarial allocation patterns. Known
    /// fragmentation risk; the `Scavenge` event exists so embedders can
    /// watch for it.
    fn scavenge(&mut self, block_size: usize) -> bool {
        for class in size_class::class_index(block_size)..NUM_SIZE_CLASSES {
            if let Some(block) = self.lists[class].pop() {
                let len = size_class::class_size(class);
                self.arena.adopt(block, len);
                self.stats.scavenges += 1;
                self.events.push(PoolEvent::Scavenge {
                    victim_class: class,
                    bytes: len,
                });
                return true;
            }
        }
        false
    }

    /// Counter view.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Total bytes ever acquired from the system for the arena.
    pub fn heap_size(&self) -> usize {
        self.arena.heap_size()
    }

    /// Free blocks currently parked in `class`'s list; 0 out of range.
    pub fn free_blocks(&self, class: usize) -> usize {
        if class < NUM_SIZE_CLASSES {
            self.lists[class].len()
        } else {
            0
        }
    }

    /// Point-in-time stats view.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            stats: self.stats,
            heap_size: self.arena.heap_size(),
            free_blocks: self.lists.iter().map(FreeList::len).sum(),
        }
    }

    /// Recorded events since creation (or the last drain).
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Drains the recorded events.
    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<S: SystemAlloc> Drop for Pool<S> {
    fn drop(&mut self) {
        // Hand every arena region back. Outstanding small blocks point
        // into these regions and die with the pool.
        for (region, len) in self.chunks.drain(..) {
            self.system.release(region, len);
        }
    }
}
