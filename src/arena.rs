//! The backing block: a bump allocator over zeroed chunks that is reclaimed
//! as a whole.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::mem::align_of;
use std::ptr::NonNull;

/// Chunks are only word aligned; anything stricter is the caller's job.
const CHUNK_ALIGN: usize = align_of::<usize>();

struct Chunk {
    ptr: NonNull<u8>,
    capacity: usize,
}

impl Chunk {
    fn new(capacity: usize) -> Self {
        let layout = Self::layout(capacity);

        // SAFETY: capacity is never zero, see `Arena::allocate_slice`
        let ptr = unsafe { alloc_zeroed(layout) };
        let ptr = match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        };

        Self { ptr, capacity }
    }

    fn layout(capacity: usize) -> Layout {
        Layout::from_size_align(capacity, CHUNK_ALIGN).expect("arena chunk too large")
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: allocated in `Chunk::new` with the same layout
        unsafe { dealloc(self.ptr.as_ptr(), Self::layout(self.capacity)) };
    }
}

/// Bump allocator backing an `ArenaAllocator`.
///
/// Chunks are requested from the system lazily, so constructing an arena is
/// free. Bytes are never handed back individually: `release` returns every
/// chunk at once, after which the arena can be used again from scratch.
///
/// Not synchronized, the owner serializes access.
pub struct Arena {
    chunks: Vec<Chunk>,
    // bump offset inside the last chunk
    offset: usize,
    block_size: usize,
    bytes_allocated: usize,
}

// SAFETY: the arena exclusively owns its chunks, nothing is thread bound
unsafe impl Send for Arena {}

impl Arena {
    pub const fn new(block_size: usize) -> Self {
        Self {
            chunks: Vec::new(),
            offset: 0,
            block_size,
            bytes_allocated: 0,
        }
    }

    /// Carves `len` zeroed bytes off the current chunk, opening a new chunk
    /// when the remainder is too small.
    ///
    /// Running out of system memory is fatal.
    pub fn allocate_slice(&mut self, len: usize) -> NonNull<u8> {
        let remaining = match self.chunks.last() {
            Some(chunk) => chunk.capacity - self.offset,
            None => 0,
        };

        if self.chunks.is_empty() || remaining < len {
            // oversized requests get a dedicated chunk
            let capacity = self.block_size.max(len).max(1);
            self.chunks.push(Chunk::new(capacity));
            self.offset = 0;
        }

        let chunk = self.chunks.last().expect("a chunk was just ensured");

        // SAFETY: offset + len <= capacity, checked above
        let ptr = unsafe { NonNull::new_unchecked(chunk.ptr.as_ptr().add(self.offset)) };

        self.offset += len;
        self.bytes_allocated += len;

        ptr
    }

    /// Returns every chunk to the system. All pointers previously handed out
    /// are dangling afterwards.
    pub fn release(&mut self) {
        self.chunks.clear();
        self.offset = 0;
        self.bytes_allocated = 0;
    }

    /// Bytes handed out since construction or the last `release`.
    #[inline]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
