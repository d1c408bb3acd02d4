//! Single-owner tracked pointer
//!
//! One heap-allocated value with exactly one owner. Storage is a tracked
//! single-element block, so construct-then-drop is net zero on the tracker.
//! Release behavior is chosen explicitly at construction: default disposal
//! drops the value in place, or a custom hook consumes it for values that
//! need external release steps (GPU handles, registered resources) before
//! the memory goes back. Deallocation and tracker bookkeeping happen
//! structurally in both cases.

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;

use crate::block::TrackedBlock;
use crate::{Category, MemoryTracker};

/// How the owned value is released when the pointer drops.
enum Release<T> {
    /// Ordinary destruction in place.
    Dispose,
    /// The hook consumes the value and performs any external teardown.
    Custom(Box<dyn FnOnce(T)>),
}

/// Owning pointer to a single tracked heap value.
///
/// Not clonable — ownership is never shared. `T` must have a non-zero
/// size; construction asserts otherwise.
pub struct OwnedPtr<T> {
    block: TrackedBlock<T>,
    release: Release<T>,
}

impl<T> OwnedPtr<T> {
    /// Move `value` onto the heap under `Category::SmartPointer`.
    pub fn new(tracker: &MemoryTracker, value: T) -> Self {
        Self::new_in(tracker, Category::SmartPointer, value)
    }

    /// Move `value` onto the heap under an explicit category.
    ///
    /// Subsystem singletons are tracked under their own tags (Engine,
    /// Renderer, ...) while still flowing through the same funnel.
    pub fn new_in(tracker: &MemoryTracker, category: Category, value: T) -> Self {
        let block: TrackedBlock<T> = TrackedBlock::alloc(tracker, category, 1);
        // SAFETY: the block holds exactly one unoccupied slot.
        unsafe { block.as_ptr().write(value) };
        Self {
            block,
            release: Release::Dispose,
        }
    }

    /// Heap-allocate a clone of a caller-held value.
    pub fn from_ref(tracker: &MemoryTracker, source: &T) -> Self
    where
        T: Clone,
    {
        Self::new(tracker, source.clone())
    }

    /// Move `value` onto the heap with a custom release hook.
    ///
    /// At drop the hook receives the value by move and is trusted to run
    /// whatever external teardown it needs; the backing memory is freed and
    /// the tracker balanced by the pointer itself either way.
    pub fn with_release(
        tracker: &MemoryTracker,
        value: T,
        hook: impl FnOnce(T) + 'static,
    ) -> Self {
        let mut owned = Self::new(tracker, value);
        owned.release = Release::Custom(Box::new(hook));
        owned
    }

    #[inline]
    pub fn get(&self) -> &T {
        // SAFETY: the single slot is initialized for the pointer's lifetime.
        unsafe { &*self.block.as_ptr() }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: the single slot is initialized and we hold &mut self.
        unsafe { &mut *self.block.as_ptr() }
    }

    /// Category the backing allocation is tracked under.
    #[inline]
    pub fn category(&self) -> Category {
        self.block.category()
    }
}

impl<T> Deref for OwnedPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> DerefMut for OwnedPtr<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T> Drop for OwnedPtr<T> {
    fn drop(&mut self) {
        let release = mem::replace(&mut self.release, Release::Dispose);
        // SAFETY: the slot is initialized and this is the only release of the
        // value — dropped in place or moved out into the hook, never both.
        unsafe {
            match release {
                Release::Dispose => ptr::drop_in_place(self.block.as_ptr()),
                Release::Custom(hook) => hook(ptr::read(self.block.as_ptr())),
            }
        }
        // The block now frees the bytes and unregisters them.
    }
}

impl<T: fmt::Debug> fmt::Debug for OwnedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedPtr").field(self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn construct_and_drop_is_net_zero() {
        let tracker = MemoryTracker::new();
        {
            let owned = OwnedPtr::new(&tracker, 42u64);
            assert_eq!(*owned, 42);
            assert_eq!(tracker.allocated_in(Category::SmartPointer), 8);
        }
        assert_eq!(tracker.allocated_in(Category::SmartPointer), 0);
        assert_eq!(tracker.total_allocated(), 0);
    }

    #[test]
    fn mutation_through_deref() {
        let tracker = MemoryTracker::new();
        let mut owned = OwnedPtr::new(&tracker, String::from("ember"));
        owned.push_str("-engine");
        assert_eq!(owned.as_str(), "ember-engine");
    }

    #[test]
    fn explicit_category_is_honored() {
        let tracker = MemoryTracker::new();
        let owned = OwnedPtr::new_in(&tracker, Category::Engine, [0u8; 32]);
        assert_eq!(owned.category(), Category::Engine);
        assert_eq!(tracker.allocated_in(Category::Engine), 32);
        assert_eq!(tracker.allocated_in(Category::SmartPointer), 0);
    }

    #[test]
    fn from_ref_clones_the_source() {
        let tracker = MemoryTracker::new();
        let source = vec![1, 2, 3];
        let owned = OwnedPtr::from_ref(&tracker, &source);
        assert_eq!(*owned, source);
        drop(source);
        assert_eq!(owned.len(), 3);
    }

    #[test]
    fn release_hook_consumes_the_value() {
        let tracker = MemoryTracker::new();
        let released = Rc::new(Cell::new(0));
        {
            let seen = released.clone();
            let owned = OwnedPtr::with_release(&tracker, 99u32, move |value| {
                seen.set(value);
            });
            assert_eq!(*owned, 99);
        }
        assert_eq!(released.get(), 99);
        // Memory is still released structurally after the hook.
        assert_eq!(tracker.total_allocated(), 0);
    }
}
