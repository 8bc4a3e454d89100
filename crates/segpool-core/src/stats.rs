//! Counters and structured pool events.
//!
//! The pool records its refill, growth, and fallback decisions as
//! in-memory structured records; tests and embedding code read the
//! counters or drain the event stream. There is no logging facade.

use serde::Serialize;

/// One recorded pool decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolEvent {
    /// A free-list miss pulled a batch of blocks from the arena.
    Refill { class: usize, blocks: usize },
    /// The arena grew by `bytes` acquired from the system.
    ArenaGrow { bytes: usize },
    /// A sub-block arena remainder was filed under its exact class.
    RemainderDonated { class: usize, bytes: usize },
    /// A spare block was stolen from a larger class to reseed the arena.
    Scavenge { victim_class: usize, bytes: usize },
    /// A request above the served ceiling went straight to the system.
    LargeAlloc { bytes: usize },
    /// A large block was handed back to the system.
    LargeFree { bytes: usize },
    /// Total exhaustion: the system refused and no class had a spare block.
    Oom { requested: usize },
}

/// Monotonic counters mirroring the event stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Free-list misses served by pulling a batch from the arena.
    pub refills: u64,
    /// System acquisitions made to grow the arena.
    pub arena_grows: u64,
    /// Arena remainders donated to a free list.
    pub remainders_donated: u64,
    /// Blocks stolen from larger classes to reseed the arena.
    pub scavenges: u64,
    /// Large requests passed through to the system.
    pub large_acquires: u64,
    /// Large blocks released back to the system.
    pub large_releases: u64,
    /// Requests that failed with `OutOfMemory`.
    pub ooms: u64,
}

/// Point-in-time view combining the counters with arena accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub stats: PoolStats,
    /// Total bytes ever acquired from the system for the arena.
    pub heap_size: usize,
    /// Free blocks currently parked across all size classes.
    pub free_blocks: usize,
}
