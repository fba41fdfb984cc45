use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::{trace, warn};

use crate::buffer::{Buffer, Reallocated};
use crate::ALIGNMENT;

/// Source of allocator ids, used to tag every buffer with its issuer.
static NEXT_ALLOCATOR_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_allocator_id() -> u64 {
    NEXT_ALLOCATOR_ID.fetch_add(1, Ordering::Relaxed)
}

/// Capability shared by every allocation strategy, so callers can swap
/// strategies behind a `&dyn Allocator`.
///
/// Every buffer returned starts on an [`ALIGNMENT`] boundary.
pub trait Allocator: Send + Sync {
    /// Returns a buffer of exactly `size` bytes.
    #[must_use = "the buffer must be handed back to `free`"]
    fn allocate(&self, size: usize) -> Buffer<'_>;

    /// Returns a buffer of `size` bytes holding the prefix of `buf`.
    ///
    /// A matching size hands `buf` straight back. Otherwise a new buffer is
    /// allocated and `min(size, buf.len())` bytes are copied into it; `buf`
    /// is returned alongside and is still live.
    fn reallocate<'a>(&'a self, size: usize, buf: Buffer<'a>) -> Reallocated<'a> {
        if size == buf.len() {
            return Reallocated::Unchanged(buf);
        }

        let mut current = self.allocate(size);
        let n = size.min(buf.len());
        current[..n].copy_from_slice(&buf[..n]);

        Reallocated::Moved {
            current,
            previous: buf,
        }
    }

    /// Gives a buffer back.
    fn free(&self, buf: Buffer<'_>);
}

/// Cache-line aligned allocations straight from the global allocator, each
/// freed on its own.
pub struct HeapAllocator {
    id: u64,
    live: AtomicUsize,
}

// only used for its alignment, to build dangling zero-length buffers
#[allow(dead_code)]
#[repr(C, align(64))]
struct CacheLine([u8; ALIGNMENT]);

impl HeapAllocator {
    pub fn new() -> Self {
        Self {
            id: next_allocator_id(),
            live: AtomicUsize::new(0),
        }
    }

    /// Number of buffers handed out and not yet freed.
    pub fn check_size(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    fn layout(size: usize) -> Layout {
        Layout::from_size_align(size, ALIGNMENT).expect("allocation too large")
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Buffer<'_> {
        let ptr = if size == 0 {
            NonNull::<CacheLine>::dangling().cast::<u8>()
        } else {
            let layout = Self::layout(size);
            // SAFETY: layout has a non-zero size
            let ptr = unsafe { alloc_zeroed(layout) };
            match NonNull::new(ptr) {
                Some(ptr) => ptr,
                None => handle_alloc_error(layout),
            }
        };

        self.live.fetch_add(1, Ordering::Relaxed);
        trace!("heap allocate [addr={:#x}, size={}]", ptr.as_ptr() as usize, size);

        // SAFETY: freshly allocated (or dangling for zero bytes) and owned by the buffer
        unsafe { Buffer::from_raw_parts(ptr, size, self.id) }
    }

    fn free(&self, mut buf: Buffer<'_>) {
        if buf.origin() != self.id {
            warn!(
                "ignoring free of a buffer from another allocator [addr={:#x}]",
                buf.addr()
            );
            return;
        }

        trace!("heap free [addr={:#x}, size={}]", buf.addr(), buf.len());
        if !buf.is_empty() {
            // SAFETY: allocated by this allocator with the same layout
            unsafe { dealloc(buf.as_mut_ptr(), Self::layout(buf.len())) };
        }
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}
