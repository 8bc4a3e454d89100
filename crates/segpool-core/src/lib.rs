//! # segpool-core
//!
//! A segregated free-list pool allocator.
//!
//! Three layers, composed bottom-up:
//!
//! - [`SystemAlloc`] — pass-through adapter over the host allocator, used
//!   for requests above the served ceiling and for arena growth.
//! - A bump arena that carves batches of equal-sized blocks and grows
//!   geometrically through the adapter.
//! - [`Pool`] — the public allocator: one intrusive free list per size
//!   class (8 to 128 bytes in 8-byte steps), O(1) LIFO alloc/free, batch
//!   refill on a miss, remainder donation, and scavenging from larger
//!   classes before reporting [`OutOfMemory`].
//!
//! `Pool` is an owned value with no process-wide state; drop returns the
//! arena to the host. The core type is single-threaded, [`LockedPool`]
//! adds a mutex for shared use. Callers must pass the allocation size back
//! to `deallocate` — the pool stores no per-block metadata.

pub mod error;
pub mod pool;
pub mod size_class;
pub mod stats;
pub mod sync;
pub mod system;

mod arena;
mod free_list;

pub use error::OutOfMemory;
pub use pool::Pool;
pub use size_class::{ALIGNMENT, MAX_SMALL_SIZE, NUM_SIZE_CLASSES, REFILL_BATCH};
pub use stats::{PoolEvent, PoolStats, StatsSnapshot};
pub use sync::LockedPool;
pub use system::{HostAlloc, SystemAlloc};
