//! Bump arena feeding the free lists.
//!
//! The arena is the cursor over the most recently adopted memory region
//! plus cumulative growth accounting. It does not own the regions: the
//! pool records every system acquisition so it can hand the memory back on
//! drop. `start_free <= end_free` always holds; the unallocated remainder
//! is `end_free - start_free`.

use std::ptr::{self, NonNull};

use crate::size_class::round_up;

pub(crate) struct Arena {
    start_free: *mut u8,
    end_free: *mut u8,
    /// Total bytes ever acquired from the system for the arena. Scales
    /// future growth requests; scavenged regions are not counted.
    heap_size: usize,
}

impl Arena {
    pub(crate) const fn new() -> Self {
        Self {
            start_free: ptr::null_mut(),
            end_free: ptr::null_mut(),
            heap_size: 0,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.end_free as usize - self.start_free as usize
    }

    pub(crate) fn heap_size(&self) -> usize {
        self.heap_size
    }

    /// Carves as many `block_size`-byte blocks as possible, up to `want`.
    ///
    /// Returns the span start and the count actually carved; `None` when
    /// the remainder cannot fit even one block.
    pub(crate) fn carve(&mut self, block_size: usize, want: usize) -> Option<(NonNull<u8>, usize)> {
        let remaining = self.remaining();
        if remaining < block_size {
            return None;
        }
        let count = want.min(remaining / block_size);
        let span = NonNull::new(self.start_free)?;
        // SAFETY: `count * block_size <= remaining`, so the bumped cursor
        // stays within the current region.
        self.start_free = unsafe { self.start_free.add(count * block_size) };
        Some((span, count))
    }

    /// Detaches the sub-block remainder, leaving the arena empty.
    ///
    /// The pool donates the returned span to the free list whose class
    /// size matches it exactly.
    pub(crate) fn take_remainder(&mut self) -> Option<(NonNull<u8>, usize)> {
        let left = self.remaining();
        if left == 0 {
            return None;
        }
        let span = NonNull::new(self.start_free)?;
        self.start_free = self.end_free;
        Some((span, left))
    }

    /// Installs `[region, region + len)` as the current bump region.
    ///
    /// Only legal once the previous region is fully carved or its
    /// remainder detached.
    pub(crate) fn adopt(&mut self, region: NonNull<u8>, len: usize) {
        debug_assert_eq!(self.remaining(), 0);
        self.start_free = region.as_ptr();
        // SAFETY: the caller hands over a region of exactly `len` bytes.
        self.end_free = unsafe { region.as_ptr().add(len) };
    }

    /// Records `bytes` freshly acquired from the system.
    pub(crate) fn record_growth(&mut self, bytes: usize) {
        self.heap_size += bytes;
    }

    /// Size of the next system acquisition: twice the batch that missed,
    /// plus a slice proportional to everything acquired so far.
    pub(crate) fn growth_request(&self, block_size: usize, want: usize) -> usize {
        2 * block_size * want + round_up(self.heap_size >> 4)
    }
}
