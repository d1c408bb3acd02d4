//! Tracked raw heap blocks
//!
//! `TrackedBlock` is the single funnel between the containers and the heap.
//! Every block registers its byte size with the tracker when allocated and
//! unregisters the identical size when dropped, so the paired-byte-count
//! contract holds structurally instead of by caller discipline.

use std::alloc::{self, handle_alloc_error, Layout};
use std::mem;
use std::ptr::NonNull;

use crate::{Category, MemoryTracker};

/// Owning handle to one tracked heap allocation of `count` elements of `T`.
///
/// The storage is raw: no element is constructed or destroyed by the block.
/// Owners write initialized values through `as_ptr` and are responsible for
/// dropping whatever they initialized before the block goes away.
pub struct TrackedBlock<T> {
    ptr: NonNull<T>,
    count: usize,
    category: Category,
    tracker: MemoryTracker,
}

impl<T> TrackedBlock<T> {
    /// Allocate storage for `count` elements, registered under `category`.
    ///
    /// `count` must be non-zero and `T` must have a non-zero size; tracking
    /// zero-byte allocations would make the balance checks meaningless.
    pub fn alloc(tracker: &MemoryTracker, category: Category, count: usize) -> Self {
        assert!(mem::size_of::<T>() != 0, "zero-sized element types are not tracked");
        assert!(count > 0, "tracked blocks cannot be empty");

        let layout = match Layout::array::<T>(count) {
            Ok(layout) => layout,
            Err(_) => panic!("allocation of {count} elements overflows the address space"),
        };

        // SAFETY: layout has non-zero size (checked above).
        let raw = unsafe { alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            handle_alloc_error(layout);
        };

        tracker.register(category, layout.size());

        Self {
            ptr,
            count,
            category,
            tracker: tracker.clone(),
        }
    }

    /// Base pointer of the block.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Number of element slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Size of the block in bytes, as registered with the tracker.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.count * mem::size_of::<T>()
    }

    /// Category this block is tracked under.
    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }
}

impl<T> Drop for TrackedBlock<T> {
    fn drop(&mut self) {
        // Frees raw bytes only; initialized elements must already be gone.
        let layout = Layout::array::<T>(self.count)
            .expect("layout was validated at allocation");
        // SAFETY: ptr was allocated with exactly this layout in `alloc`.
        unsafe {
            alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
        }
        self.tracker.unregister(self.category, layout.size());
    }
}
