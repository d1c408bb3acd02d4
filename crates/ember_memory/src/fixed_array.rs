//! Fixed-capacity inline array
//!
//! For element counts known at compile time. Storage is inline (stack or
//! enclosing struct), so there is no capacity concept and no tracker
//! interaction — the heap is never touched.

use std::ops::{Index, IndexMut};
use std::slice;

/// Owning, contiguous sequence of exactly `S` elements.
///
/// `S == 0` is rejected at compile time.
pub struct FixedArray<T, const S: usize> {
    array: [T; S],
}

impl<T, const S: usize> FixedArray<T, S> {
    const NON_EMPTY: () = assert!(S > 0, "FixedArray must hold at least one element");

    /// Default-construct all `S` slots.
    pub fn new() -> Self
    where
        T: Default,
    {
        let () = Self::NON_EMPTY;
        Self {
            array: std::array::from_fn(|_| T::default()),
        }
    }

    /// Fill all `S` slots with clones of `value`.
    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        let () = Self::NON_EMPTY;
        Self {
            array: std::array::from_fn(|_| value.clone()),
        }
    }

    /// Number of elements (always `S`).
    #[inline]
    pub const fn len(&self) -> usize {
        S
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.array
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.array
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.array.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.array.iter_mut()
    }
}

impl<T, const S: usize> From<[T; S]> for FixedArray<T, S> {
    fn from(array: [T; S]) -> Self {
        let () = Self::NON_EMPTY;
        Self { array }
    }
}

impl<T: Default, const S: usize> Default for FixedArray<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const S: usize> Index<usize> for FixedArray<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < S, "index {index} out of bounds (size {S})");
        &self.array[index]
    }
}

impl<T, const S: usize> IndexMut<usize> for FixedArray<T, S> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < S, "index {index} out of bounds (size {S})");
        &mut self.array[index]
    }
}

impl<'a, T, const S: usize> IntoIterator for &'a FixedArray<T, S> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const S: usize> IntoIterator for &'a mut FixedArray<T, S> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: std::fmt::Debug, const S: usize> std::fmt::Debug for FixedArray<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_construction() {
        let array: FixedArray<u32, 4> = FixedArray::new();
        assert_eq!(array.len(), 4);
        assert_eq!(array.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn splat_fills_every_slot() {
        let array: FixedArray<String, 3> = FixedArray::splat("x".to_string());
        assert_eq!(array.len(), 3);
        assert!(array.iter().all(|s| s == "x"));
    }

    #[test]
    fn indexed_writes() {
        let mut array = FixedArray::from([1, 2, 3]);
        array[1] = 20;
        assert_eq!(array.as_slice(), &[1, 20, 3]);
        assert_eq!(array.iter().sum::<i32>(), 24);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_past_size_aborts() {
        let array: FixedArray<u8, 2> = FixedArray::new();
        let _ = array[2];
    }
}
