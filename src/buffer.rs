use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;
use core::slice;

/// A byte range handed out by an [`Allocator`](crate::Allocator).
///
/// The handle is the only way to reach its bytes, and giving it back to
/// `free` consumes it, so a buffer can't be freed twice or touched after the
/// memory behind it is reclaimed. The lifetime ties it to the allocator that
/// issued it.
///
/// A buffer dropped without being freed stays live in its arena forever, so
/// the arena is never released:
///
/// ```compile_fail
/// #![deny(unused_must_use)]
/// use rsarena::{Allocator, ArenaAllocator};
///
/// fn main() {
///     let allocator = ArenaAllocator::new();
///     allocator.allocate(8);
/// }
/// ```
#[must_use = "a buffer that is never freed keeps its arena from being released"]
pub struct Buffer<'a> {
    ptr: NonNull<u8>,
    len: usize,
    origin: u64,
    _marker: PhantomData<&'a mut [u8]>,
}

// SAFETY: a buffer exclusively owns its byte range
unsafe impl Send for Buffer<'_> {}
unsafe impl Sync for Buffer<'_> {}

impl Buffer<'_> {
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes for as long as
    /// the buffer exists, and no other live buffer may overlap the range.
    pub(crate) unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, origin: u64) -> Self {
        Self {
            ptr,
            len,
            origin,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Starting address, the identity the issuing allocator tracks.
    #[inline]
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: guaranteed by `from_raw_parts`
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: guaranteed by `from_raw_parts`, `&mut self` makes it unique
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn origin(&self) -> u64 {
        self.origin
    }
}

impl Deref for Buffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for Buffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl AsRef<[u8]> for Buffer<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for Buffer<'_> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl fmt::Debug for Buffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len)
            .finish()
    }
}

/// Outcome of [`Allocator::reallocate`](crate::Allocator::reallocate).
///
/// Reallocation never frees the buffer it was given. When a copy was made,
/// the previous buffer is handed back and stays live until it is freed.
#[must_use = "a moved reallocation returns the previous buffer, which must still be freed"]
#[derive(Debug)]
pub enum Reallocated<'a> {
    /// The requested size matched; this is the original buffer.
    Unchanged(Buffer<'a>),
    /// A fresh buffer holding a copy of the previous one's prefix.
    Moved {
        current: Buffer<'a>,
        previous: Buffer<'a>,
    },
}

impl<'a> Reallocated<'a> {
    /// The buffer to use from now on.
    pub fn buffer(&self) -> &Buffer<'a> {
        match self {
            Reallocated::Unchanged(buf) => buf,
            Reallocated::Moved { current, .. } => current,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, Reallocated::Moved { .. })
    }

    /// Splits into the buffer to use and, if any, the one still to be freed.
    pub fn into_parts(self) -> (Buffer<'a>, Option<Buffer<'a>>) {
        match self {
            Reallocated::Unchanged(buf) => (buf, None),
            Reallocated::Moved { current, previous } => (current, Some(previous)),
        }
    }
}
