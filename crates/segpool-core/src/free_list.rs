//! Intrusive singly-linked free list.
//!
//! A free block's leading bytes hold the pointer to the next free block of
//! the same class, so the list costs nothing beyond the blocks themselves.
//! `ALIGNMENT` is at least the pointer size and alignment on every
//! supported target, which is what makes the reinterpretation sound. All
//! reinterpretation of block storage in the crate happens here.

use std::ptr::{self, NonNull};

/// Head of one size class's chain of free blocks.
///
/// Stack discipline: the most recently pushed block is popped first.
#[derive(Debug)]
pub(crate) struct FreeList {
    head: *mut u8,
    len: usize,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self {
            head: ptr::null_mut(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Pushes `block` onto the head of the list.
    ///
    /// # Safety
    ///
    /// `block` must point to at least `ALIGNMENT` bytes of
    /// `ALIGNMENT`-aligned memory that nothing else owns: not a live
    /// allocation, not a member of any list, not arena remainder.
    pub(crate) unsafe fn push(&mut self, block: NonNull<u8>) {
        let slot = block.as_ptr().cast::<*mut u8>();
        // SAFETY: per the contract the block is free, writable, and
        // aligned strongly enough to store a pointer in its leading bytes.
        unsafe { ptr::write(slot, self.head) };
        self.head = block.as_ptr();
        self.len += 1;
    }

    /// Pops the head block, or `None` if the list is empty.
    pub(crate) fn pop(&mut self) -> Option<NonNull<u8>> {
        let head = NonNull::new(self.head)?;
        // SAFETY: every listed block was linked by `push`, so its leading
        // bytes hold the next pointer written there.
        self.head = unsafe { ptr::read(head.as_ptr().cast::<*mut u8>()) };
        self.len -= 1;
        Some(head)
    }

    /// Threads `count` consecutive `block_size`-byte blocks starting at
    /// `base` onto the list. Blocks are pushed back-to-front so the chain
    /// runs in ascending address order from the new head.
    ///
    /// # Safety
    ///
    /// `[base, base + count * block_size)` must be a valid, exclusively
    /// owned span, and `block_size` a nonzero multiple of `ALIGNMENT`.
    pub(crate) unsafe fn push_span(
        &mut self,
        base: NonNull<u8>,
        block_size: usize,
        count: usize,
    ) {
        for i in (0..count).rev() {
            // SAFETY: `i * block_size` stays inside the span.
            let block = unsafe { NonNull::new_unchecked(base.as_ptr().add(i * block_size)) };
            // SAFETY: each block is a distinct free slice of the span.
            unsafe { self.push(block) };
        }
    }
}
