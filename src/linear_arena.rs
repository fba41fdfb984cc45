use std::collections::HashSet;
use std::ptr::NonNull;

use tracing::{debug, trace, warn};

use crate::allocator::{next_allocator_id, Allocator};
use crate::arena::Arena;
use crate::buffer::Buffer;
use crate::error::ArenaError;
use crate::options::ArenaOptions;
use crate::spin_lock::SpinLock;
use crate::utils::{address_of, alignment_shift};
use crate::ALIGNMENT;

struct ArenaState {
    arena: Arena,
    // starting addresses of the buffers currently handed out
    live: HashSet<usize>,
    releases: usize,
}

/// Arena-backed allocator that hands out cache-line aligned buffers.
///
/// Every buffer is carved from one backing [`Arena`]. Buffers are not
/// reclaimed one by one: the allocator remembers which ones are live and
/// releases the whole arena when the last of them is freed. The next
/// allocation after that starts a fresh arena.
///
/// Carving, registering, and the bulk release all happen under a single
/// lock, so the allocator can be shared freely between threads.
pub struct ArenaAllocator {
    id: u64,
    state: SpinLock<ArenaState>,
}

impl ArenaAllocator {
    pub fn new() -> Self {
        Self::from_valid_options(ArenaOptions::default())
    }

    pub fn with_options(options: ArenaOptions) -> Result<Self, ArenaError> {
        options.validate()?;
        Ok(Self::from_valid_options(options))
    }

    fn from_valid_options(options: ArenaOptions) -> Self {
        Self {
            id: next_allocator_id(),
            state: SpinLock::new(ArenaState {
                arena: Arena::new(options.block_size),
                live: HashSet::new(),
                releases: 0,
            }),
        }
    }

    /// Number of buffers handed out and not yet freed.
    pub fn check_size(&self) -> usize {
        self.state.lock().live.len()
    }

    /// How many times the backing arena has been released.
    pub fn release_count(&self) -> usize {
        self.state.lock().releases
    }

    /// Bytes carved from the current backing arena, padding included.
    pub fn bytes_reserved(&self) -> usize {
        self.state.lock().arena.bytes_allocated()
    }

    /// Like [`Allocator::free`], but reports buffers that were not live here.
    ///
    /// An unknown buffer never triggers a release of the backing arena.
    pub fn try_free(&self, buf: Buffer<'_>) -> Result<(), ArenaError> {
        let addr = address_of(&buf);

        if buf.origin() != self.id {
            return Err(ArenaError::ForeignBuffer { addr });
        }

        // Start of the critical section
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !state.live.remove(&addr) {
            return Err(ArenaError::UntrackedBuffer { addr });
        }
        trace!("arena free [addr={:#x}, size={}]", addr, buf.len());

        if !state.live.is_empty() {
            return Ok(());
        }

        debug!(
            "releasing backing arena [bytes={}, chunks={}]",
            state.arena.bytes_allocated(),
            state.arena.chunk_count()
        );
        state.arena.release();
        state.releases += 1;

        Ok(())
    }
}

impl Default for ArenaAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for ArenaAllocator {
    fn allocate(&self, size: usize) -> Buffer<'_> {
        let padded = size
            .checked_add(ALIGNMENT)
            .expect("allocation size overflows");

        // Start of the critical section
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let raw = state.arena.allocate_slice(padded);

        // slide forward to the next cache line, the padding always covers it
        let shift = alignment_shift(raw.as_ptr() as usize, ALIGNMENT);
        // SAFETY: shift < ALIGNMENT, so [shift, shift + size) is inside the padded slice
        let ptr = unsafe { NonNull::new_unchecked(raw.as_ptr().add(shift)) };
        let addr = ptr.as_ptr() as usize;

        let inserted = state.live.insert(addr);
        debug_assert!(inserted, "address {addr:#x} registered twice");

        SpinLock::unlock(guard);

        trace!("arena allocate [addr={:#x}, size={}, shift={}]", addr, size, shift);

        // SAFETY: the range is fresh, exclusive to this buffer, and stays
        // allocated until the buffer is freed
        unsafe { Buffer::from_raw_parts(ptr, size, self.id) }
    }

    fn free(&self, buf: Buffer<'_>) {
        if let Err(err) = self.try_free(buf) {
            warn!("ignoring free: {}", err);
        }
    }
}
