//! Cache-line aligned arena allocation for columnar buffers.
//!
//! [`ArenaAllocator`] carves 64-byte aligned buffers out of a bump arena and
//! gives the whole arena back once every buffer has been freed.
//! [`HeapAllocator`] serves the same [`Allocator`] capability from the global
//! heap, one allocation per buffer.

mod allocator;
mod arena;
mod buffer;
mod error;
mod linear_arena;
mod options;
mod spin_lock;
mod utils;

pub use allocator::{Allocator, HeapAllocator};
pub use arena::Arena;
pub use buffer::{Buffer, Reallocated};
pub use error::ArenaError;
pub use linear_arena::ArenaAllocator;
pub use options::ArenaOptions;
pub use spin_lock::{SpinLock, SpinLockGuard};

/// Alignment of every buffer handed out, one cache line.
pub const ALIGNMENT: usize = 64;

pub const DEFAULT_BLOCK_SIZE: usize = 128 * 1024;
