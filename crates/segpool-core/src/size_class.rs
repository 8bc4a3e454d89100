//! Size classes for the small-allocation path.
//!
//! Requests up to `MAX_SMALL_SIZE` bytes are rounded up to a multiple of
//! `ALIGNMENT` and grouped into one free list per class. Anything larger
//! bypasses the pool and goes straight to the system adapter.

/// Alignment unit and class granularity (bytes).
pub const ALIGNMENT: usize = 8;

/// Largest request served from the free lists. Above this, the system path.
pub const MAX_SMALL_SIZE: usize = 128;

/// Number of size classes: 8, 16, ..., 128.
pub const NUM_SIZE_CLASSES: usize = MAX_SMALL_SIZE / ALIGNMENT;

/// Target number of blocks pulled from the arena per free-list refill.
pub const REFILL_BATCH: usize = 20;

/// Rounds `n` up to the next multiple of `ALIGNMENT`.
pub fn round_up(n: usize) -> usize {
    (n + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Class index for a request of `n` bytes.
///
/// `n` must be in `1..=MAX_SMALL_SIZE`; larger requests never reach the
/// class machinery.
pub fn class_index(n: usize) -> usize {
    debug_assert!(n >= 1 && n <= MAX_SMALL_SIZE);
    (n + ALIGNMENT - 1) / ALIGNMENT - 1
}

/// Block size served by class `index`.
pub fn class_size(index: usize) -> usize {
    debug_assert!(index < NUM_SIZE_CLASSES);
    (index + 1) * ALIGNMENT
}
