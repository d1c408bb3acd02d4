//! Raw storage owner
//!
//! Owns a tracked block of uninitialized slots for callers that place and
//! destroy elements themselves. The storage frees its raw bytes on drop and
//! never runs element destructors — the lifecycle of anything placed into
//! it belongs entirely to the caller.

use std::mem::MaybeUninit;
use std::slice;

use crate::block::TrackedBlock;
use crate::{Category, MemoryTracker};

/// Owning handle to `len` uninitialized slots of `T`.
///
/// Storage is allocated at most once per instance, either at construction
/// or through a single [`RawStorage::allocate`] call. `T` must have a
/// non-zero size; allocation asserts otherwise.
pub struct RawStorage<T> {
    block: Option<TrackedBlock<T>>,
    category: Category,
    tracker: MemoryTracker,
}

impl<T> RawStorage<T> {
    /// Allocate `len` raw slots up front. `len == 0` defers allocation.
    pub fn with_capacity(tracker: &MemoryTracker, category: Category, len: usize) -> Self {
        let block = (len > 0).then(|| TrackedBlock::alloc(tracker, category, len));
        Self {
            block,
            category,
            tracker: tracker.clone(),
        }
    }

    /// Create an empty handle; storage comes later via `allocate`.
    pub fn empty(tracker: &MemoryTracker, category: Category) -> Self {
        Self::with_capacity(tracker, category, 0)
    }

    /// One-time allocation of `len` raw slots.
    ///
    /// Allocating over existing storage is a contract violation and aborts.
    pub fn allocate(&mut self, len: usize) {
        assert!(
            self.block.is_none(),
            "raw storage is already allocated ({} slots)",
            self.len()
        );
        assert!(len > 0, "raw storage allocation must be non-zero");
        self.block = Some(TrackedBlock::alloc(&self.tracker, self.category, len));
    }

    /// Number of slots, zero when unallocated.
    #[inline]
    pub fn len(&self) -> usize {
        self.block.as_ref().map_or(0, TrackedBlock::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Base pointer of the storage. Aborts when unallocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.require_block().as_ptr()
    }

    /// Mutable base pointer of the storage. Aborts when unallocated.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.require_block().as_ptr()
    }

    /// The slots as an uninitialized slice, for placement writes.
    ///
    /// Empty when unallocated.
    pub fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<T>] {
        match &self.block {
            // SAFETY: the block owns len slots; MaybeUninit makes no
            // initialization claim.
            Some(block) => unsafe {
                slice::from_raw_parts_mut(block.as_ptr().cast::<MaybeUninit<T>>(), block.len())
            },
            None => &mut [],
        }
    }

    /// Category the storage is tracked under.
    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    fn require_block(&self) -> &TrackedBlock<T> {
        self.block
            .as_ref()
            .expect("raw storage has not been allocated")
    }
}

// No Drop impl: the block frees its raw bytes, and by contract no element
// destructor runs for placed objects.
