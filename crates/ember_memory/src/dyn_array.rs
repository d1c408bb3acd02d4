//! Growable tracked array
//!
//! The primary collection type of the memory core. Storage lives in a
//! [`TrackedBlock`] under `Category::DynamicArray`; elements are moved and
//! cloned per element, never byte-copied, so any element type is safe to
//! store. Capacity doubles relative to the requested target and only ever
//! shrinks on an explicit rebuild.

use std::ops::{Index, IndexMut};
use std::ptr;
use std::slice;

use crate::block::TrackedBlock;
use crate::{Category, MemoryTracker};

/// Scale factor applied to a target size whenever capacity must change.
pub const GROWTH_FACTOR: usize = 2;

/// Owning, contiguous, resizable sequence with tracked storage.
///
/// Invariants: `capacity >= len`, a block exists exactly when capacity is
/// non-zero, and slots `0..len` are initialized. `T` must have a non-zero
/// size; the first allocation asserts otherwise.
pub struct DynArray<T> {
    len: usize,
    block: Option<TrackedBlock<T>>,
    tracker: MemoryTracker,
}

impl<T> DynArray<T> {
    /// Create an empty array. No storage is allocated until first growth.
    pub fn new(tracker: &MemoryTracker) -> Self {
        Self {
            len: 0,
            block: None,
            tracker: tracker.clone(),
        }
    }

    /// Create an array of `len` default-constructed elements with capacity
    /// `len * GROWTH_FACTOR`.
    pub fn with_len(tracker: &MemoryTracker, len: usize) -> Self
    where
        T: Default,
    {
        let mut array = Self::new(tracker);
        array.resize(len);
        array
    }

    /// Create an array of `len` clones of `value` with capacity
    /// `len * GROWTH_FACTOR`.
    pub fn with_value(tracker: &MemoryTracker, len: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut array = Self::new(tracker);
        if len > 0 {
            array.rebuild_capacity(len);
            let base = array.data_ptr();
            for i in 0..len {
                // SAFETY: capacity covers 0..len and each slot is written once.
                unsafe { base.add(i).write(value.clone()) };
            }
            array.len = len;
        }
        array
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current storage can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, TrackedBlock::len)
    }

    /// Append one element, growing storage when full. Amortized O(1).
    pub fn push_back(&mut self, value: T) {
        if self.len + 1 > self.capacity() {
            self.rebuild_capacity(self.len + 1);
        }
        // SAFETY: capacity now exceeds len; the slot at len is unoccupied.
        unsafe { self.data_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Grow to `new_len` elements, default-constructing the new slots.
    ///
    /// No-op when `new_len` does not exceed the current length — shrinking
    /// goes through [`DynArray::downsize`].
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        if new_len <= self.len {
            return;
        }
        if new_len > self.capacity() {
            self.rebuild_capacity(new_len);
        }
        let base = self.data_ptr();
        for i in self.len..new_len {
            // SAFETY: capacity covers new_len; slots len..new_len are unoccupied.
            unsafe { base.add(i).write(T::default()) };
        }
        self.len = new_len;
    }

    /// Shrink the live length to `new_len`, dropping the truncated elements.
    ///
    /// Storage is untouched. No-op when `new_len` exceeds the length.
    pub fn downsize(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let truncated = self.len - new_len;
        let base = self.data_ptr();
        // SAFETY: slots new_len..len are initialized and become dead here.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(new_len), truncated));
        }
        self.len = new_len;
    }

    /// Force capacity to cover a post-growth target.
    ///
    /// Callers pass a target that already accounts for the growth factor;
    /// the rebuilt capacity lands at `(target / GROWTH_FACTOR) *
    /// GROWTH_FACTOR`. Never shrinks below the current capacity.
    pub fn reserve(&mut self, target: usize) {
        assert!(target > 0, "reserve target must be non-zero");
        let scaled = target / GROWTH_FACTOR;
        if scaled * GROWTH_FACTOR > self.capacity() {
            self.rebuild_capacity(scaled);
        }
    }

    /// Clone every element of `values` onto the end, growing first if needed.
    pub fn append_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        if values.is_empty() {
            return;
        }
        if self.len + values.len() > self.capacity() {
            self.rebuild_capacity(self.len + values.len());
        }
        let base = self.data_ptr();
        for (i, value) in values.iter().enumerate() {
            // SAFETY: capacity covers len + values.len(); slots past len are unoccupied.
            unsafe { base.add(self.len + i).write(value.clone()) };
        }
        self.len += values.len();
    }

    /// Clone another array's contents onto the end.
    pub fn append_array(&mut self, other: &DynArray<T>)
    where
        T: Clone,
    {
        self.append_slice(other.as_slice());
    }

    /// Remove the element at `index`, preserving the order of the rest.
    ///
    /// Rebuilds the backing block at the same capacity and moves the prefix
    /// and suffix across — O(n), no in-place shift.
    pub fn remove_at(&mut self, index: usize) {
        assert!(
            index < self.len,
            "remove_at index {index} out of bounds (len {})",
            self.len
        );
        let old = self.block.take().expect("non-empty array always has a block");
        let replacement = TrackedBlock::alloc(&self.tracker, Category::DynamicArray, old.len());
        // SAFETY: slots 0..len of the old block are initialized; every element
        // is either moved into the replacement or dropped exactly once, and
        // the old block frees raw bytes only.
        unsafe {
            ptr::copy_nonoverlapping(old.as_ptr(), replacement.as_ptr(), index);
            ptr::drop_in_place(old.as_ptr().add(index));
            ptr::copy_nonoverlapping(
                old.as_ptr().add(index + 1),
                replacement.as_ptr().add(index),
                self.len - index - 1,
            );
        }
        self.block = Some(replacement);
        self.len -= 1;
    }

    /// Drop every element and reset the length to zero.
    ///
    /// Capacity and the backing block are retained until destruction.
    pub fn clear(&mut self) {
        if self.len > 0 {
            let base = self.data_ptr();
            // SAFETY: slots 0..len are initialized and become dead here.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, self.len));
            }
            self.len = 0;
        }
    }

    /// Clone-assign `value` into every live slot.
    pub fn fill(&mut self, value: &T)
    where
        T: Clone,
    {
        for slot in self.as_mut_slice() {
            *slot = value.clone();
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Borrow the live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match &self.block {
            // SAFETY: slots 0..len are initialized.
            Some(block) => unsafe { slice::from_raw_parts(block.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// Borrow the live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &self.block {
            // SAFETY: slots 0..len are initialized and we hold &mut self.
            Some(block) => unsafe { slice::from_raw_parts_mut(block.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Base pointer of the backing block. Valid only when capacity > 0.
    #[inline]
    fn data_ptr(&self) -> *mut T {
        self.block
            .as_ref()
            .expect("storage must be allocated before access")
            .as_ptr()
    }

    /// Replace the backing block with one of capacity
    /// `target * GROWTH_FACTOR`, moving the live elements across.
    fn rebuild_capacity(&mut self, target: usize) {
        let new_capacity = target * GROWTH_FACTOR;
        debug_assert!(new_capacity >= self.len, "rebuild would clip live elements");
        let replacement =
            TrackedBlock::alloc(&self.tracker, Category::DynamicArray, new_capacity);
        if let Some(old) = self.block.take() {
            // SAFETY: moves the initialized prefix; ownership of each element
            // transfers to the replacement and the old block frees raw bytes
            // only.
            unsafe { ptr::copy_nonoverlapping(old.as_ptr(), replacement.as_ptr(), self.len) };
        }
        self.block = Some(replacement);
    }
}

impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(
            index < self.len,
            "index {index} out of bounds (len {})",
            self.len
        );
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(
            index < self.len,
            "index {index} out of bounds (len {})",
            self.len
        );
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // Elements first; the block then frees and unregisters its bytes.
        self.clear();
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts drops so element-lifecycle bugs show up as wrong counts.
    struct DropProbe {
        hits: Rc<Cell<usize>>,
    }

    impl DropProbe {
        fn new(hits: &Rc<Cell<usize>>) -> Self {
            Self { hits: hits.clone() }
        }
    }

    impl Clone for DropProbe {
        fn clone(&self) -> Self {
            Self {
                hits: self.hits.clone(),
            }
        }
    }

    impl Drop for DropProbe {
        fn drop(&mut self) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[test]
    fn push_back_maintains_size_and_capacity_law() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        for i in 0..100 {
            array.push_back(i);
            assert_eq!(array.len(), i + 1);
            assert!(array.capacity() >= array.len());
        }
        for i in 0..100 {
            assert_eq!(array[i], i);
        }
    }

    #[test]
    fn with_value_fills_every_slot() {
        let tracker = MemoryTracker::new();
        let array = DynArray::with_value(&tracker, 5, 7u32);
        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 10);
        assert_eq!(array.as_slice(), &[7, 7, 7, 7, 7]);
    }

    #[test]
    fn resize_grows_but_never_shrinks() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        array.push_back(1);
        array.push_back(2);
        array.push_back(3);

        array.resize(2);
        assert_eq!(array.as_slice(), &[1, 2, 3]);

        array.resize(6);
        assert_eq!(array.len(), 6);
        assert!(array.capacity() >= 6);
        assert_eq!(array.as_slice(), &[1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn downsize_drops_truncated_elements() {
        let tracker = MemoryTracker::new();
        let hits = Rc::new(Cell::new(0));
        let mut array = DynArray::new(&tracker);
        for _ in 0..4 {
            array.push_back(DropProbe::new(&hits));
        }
        let capacity = array.capacity();

        array.downsize(1);
        assert_eq!(array.len(), 1);
        assert_eq!(hits.get(), 3);
        assert_eq!(array.capacity(), capacity);

        array.downsize(5);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn remove_at_drops_exactly_the_indexed_element() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        for v in [1, 2, 3] {
            array.push_back(v);
        }
        array.remove_at(0);
        assert_eq!(array.as_slice(), &[2, 3]);

        let mut letters = DynArray::new(&tracker);
        for c in ["a", "b", "c", "d"] {
            letters.push_back(c.to_string());
        }
        letters.remove_at(2);
        assert_eq!(letters.len(), 3);
        assert_eq!(letters[0], "a");
        assert_eq!(letters[1], "b");
        assert_eq!(letters[2], "d");
    }

    #[test]
    fn remove_at_keeps_tracker_balanced() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        for i in 0..8u64 {
            array.push_back(i);
        }
        let live = tracker.allocated_in(Category::DynamicArray);
        array.remove_at(3);
        // Same capacity, fresh block: balance unchanged.
        assert_eq!(tracker.allocated_in(Category::DynamicArray), live);
        drop(array);
        assert_eq!(tracker.allocated_in(Category::DynamicArray), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn remove_at_past_end_aborts() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        array.push_back(1);
        array.remove_at(1);
    }

    #[test]
    fn clear_keeps_capacity_and_block() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        for i in 0..10 {
            array.push_back(i);
        }
        let capacity = array.capacity();
        let live = tracker.allocated_in(Category::DynamicArray);

        array.clear();
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), capacity);
        assert_eq!(tracker.allocated_in(Category::DynamicArray), live);

        // Refilling within the old capacity must not reallocate.
        for i in 0..10 {
            array.push_back(i);
        }
        assert_eq!(array.capacity(), capacity);
    }

    #[test]
    fn reserve_uses_pre_scaled_target() {
        let tracker = MemoryTracker::new();
        let mut array: DynArray<u8> = DynArray::new(&tracker);
        array.reserve(64);
        assert_eq!(array.capacity(), 64);

        // A smaller target never shrinks.
        array.reserve(8);
        assert_eq!(array.capacity(), 64);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn reserve_zero_target_aborts() {
        let tracker = MemoryTracker::new();
        let mut array: DynArray<u8> = DynArray::new(&tracker);
        array.reserve(0);
    }

    #[test]
    fn append_slice_and_array() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        array.append_slice(&[1, 2, 3]);
        assert_eq!(array.as_slice(), &[1, 2, 3]);

        let other = DynArray::with_value(&tracker, 2, 9);
        array.append_array(&other);
        assert_eq!(array.as_slice(), &[1, 2, 3, 9, 9]);
        assert!(array.capacity() >= 5);
    }

    #[test]
    fn fill_clones_into_live_slots_only() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::with_len(&tracker, 3);
        array.fill(&42);
        assert_eq!(array.as_slice(), &[42, 42, 42]);
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn drop_releases_every_element_and_all_bytes() {
        let tracker = MemoryTracker::new();
        let hits = Rc::new(Cell::new(0));
        {
            let mut array = DynArray::new(&tracker);
            for _ in 0..6 {
                array.push_back(DropProbe::new(&hits));
            }
            array.remove_at(2);
            array.clear();
        }
        // 6 pushed: 1 dropped by remove_at, 5 by clear.
        assert_eq!(hits.get(), 6);
        assert_eq!(tracker.total_allocated(), 0);
    }

    #[test]
    fn iteration_and_access() {
        let tracker = MemoryTracker::new();
        let mut array = DynArray::new(&tracker);
        for i in 1..=4 {
            array.push_back(i);
        }
        assert_eq!(array.front(), Some(&1));
        assert_eq!(array.back(), Some(&4));
        assert_eq!(array.iter().sum::<i32>(), 10);
        for value in &mut array {
            *value *= 2;
        }
        assert_eq!(array.as_slice(), &[2, 4, 6, 8]);
        assert_eq!(array.get(7), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_past_len_aborts() {
        let tracker = MemoryTracker::new();
        let array = DynArray::with_len(&tracker, 2);
        let _: i32 = array[2];
    }
}
