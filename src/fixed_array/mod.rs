/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::dynamic_array::{self, DynamicArray, Iter, IterMut};
use crate::error::ArrayError;
use alloc::vec::Vec;
use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};
use core::ops::{Index, IndexMut};
use core::ptr::NonNull;
use core::slice::SliceIndex;

/// Creates a [`FixedArray`](crate::FixedArray) whose size is the number of arguments:
///
/// ```
/// # use dynarray::*;
/// #
/// let a = fixed_array![1, 2, 3];
///
/// assert_eq!(a.size(), 3);
/// assert_eq!(a, FixedArray::<_, 3>::from([1, 2, 3]));
/// ```
#[macro_export]
macro_rules! fixed_array {
    ($($e:expr),* $(,)?) => {
        $crate::FixedArray::from([$($e),*])
    };
}

/// A heap-allocated array of exactly `N` elements.
///
/// The size is part of the type.  Building one from a source of a different length fails with
/// [`ArrayError::LengthMismatch`].
///
/// # Example
///
/// ```rust
/// use dynarray::{ArrayError, FixedArray};
///
/// let a: FixedArray<i32, 3> = FixedArray::try_from_iter(vec![1, 2, 3]).unwrap();
///
/// assert_eq!(a.at(2), Ok(&3));
/// assert_eq!(
///     FixedArray::<i32, 3>::try_from_iter(vec![1, 2]),
///     Err(ArrayError::LengthMismatch { expected: 3, actual: 2 })
/// );
/// ```
#[derive(Clone)]
pub struct FixedArray<T, const N: usize> {
    array: DynamicArray<T>,
}

impl<T: Default, const N: usize> FixedArray<T, N> {
    /// Creates an array of `N` default values.
    #[must_use]
    pub fn new() -> FixedArray<T, N> {
        let mut array = DynamicArray::with_capacity(N);
        array.resize_default(N);
        FixedArray { array }
    }
}

impl<T: Clone, const N: usize> FixedArray<T, N> {
    #[must_use]
    pub fn from_elem(value: T) -> FixedArray<T, N> {
        FixedArray { array: DynamicArray::from_elem(value, N) }
    }

    pub fn fill(&mut self, value: T) {
        self.array.as_mut_slice().fill(value);
    }
}

impl<T, const N: usize> FixedArray<T, N> {
    /// Builds the array from an iterator that must yield exactly `N` elements.
    pub fn try_from_iter<I>(iter: I) -> Result<FixedArray<T, N>, ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        DynamicArray::from_exact_iter(N, iter).map(|array| FixedArray { array })
    }

    #[must_use]
    #[inline]
    pub const fn size(&self) -> usize {
        N
    }

    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        self.array.at(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        self.array.at_mut(index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.array.get(index)
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.array.front()
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.array.back()
    }

    /// Pointer to the first element, or `None` when `N == 0`.
    #[must_use]
    pub fn data(&self) -> Option<NonNull<T>> {
        self.array.data()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.array.as_slice()
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.array.as_mut_slice()
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.array.iter()
    }

    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.array.iter_mut()
    }

    #[must_use]
    pub fn into_dynamic_array(self) -> DynamicArray<T> {
        self.array
    }
}

impl<T: Default, const N: usize> Default for FixedArray<T, N> {
    fn default() -> FixedArray<T, N> {
        FixedArray::new()
    }
}

impl<T, const N: usize> From<[T; N]> for FixedArray<T, N> {
    fn from(values: [T; N]) -> FixedArray<T, N> {
        FixedArray { array: DynamicArray::from(values) }
    }
}

impl<T, const N: usize> TryFrom<DynamicArray<T>> for FixedArray<T, N> {
    type Error = ArrayError;

    fn try_from(array: DynamicArray<T>) -> Result<FixedArray<T, N>, ArrayError> {
        if array.len() == N {
            Ok(FixedArray { array })
        } else {
            Err(ArrayError::LengthMismatch { expected: N, actual: array.len() })
        }
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for FixedArray<T, N> {
    type Error = ArrayError;

    fn try_from(values: Vec<T>) -> Result<FixedArray<T, N>, ArrayError> {
        FixedArray::try_from(DynamicArray::from(values))
    }
}

impl<T, I, const N: usize> Index<I> for FixedArray<T, N>
where
    I: SliceIndex<[T]>,
{
    type Output = I::Output;

    fn index(&self, index: I) -> &I::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I, const N: usize> IndexMut<I> for FixedArray<T, N>
where
    I: SliceIndex<[T]>,
{
    fn index_mut(&mut self, index: I) -> &mut I::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T: PartialEq<U>, U, const N: usize, const M: usize> PartialEq<FixedArray<U, M>> for FixedArray<T, N> {
    fn eq(&self, other: &FixedArray<U, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for FixedArray<T, N> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Eq, const N: usize> Eq for FixedArray<T, N> {}

impl<T: Hash, const N: usize> Hash for FixedArray<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.array.hash(state);
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for FixedArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Display, const N: usize> Display for FixedArray<T, N> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.array, fmt)
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a FixedArray<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut FixedArray<T, N> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T, const N: usize> IntoIterator for FixedArray<T, N> {
    type Item = T;
    type IntoIter = dynamic_array::IntoIter<T>;

    fn into_iter(self) -> dynamic_array::IntoIter<T> {
        self.array.into_iter()
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{self, Deserialize, Deserializer};
    use ::serde::ser::{Serialize, Serializer};

    impl<T, const N: usize> Serialize for FixedArray<T, N>
    where
        T: Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.array.serialize(serializer)
        }
    }

    impl<'de, T, const N: usize> Deserialize<'de> for FixedArray<T, N>
    where
        T: Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<FixedArray<T, N>, D::Error> {
            let array: DynamicArray<T> = DynamicArray::deserialize(deserializer)?;
            let len = array.len();

            FixedArray::try_from(array).map_err(|_| de::Error::invalid_length(len, &ExpectedLength(N)))
        }
    }

    struct ExpectedLength(usize);

    impl de::Expected for ExpectedLength {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a sequence of {} elements", self.0)
        }
    }
}

#[cfg(test)]
mod test;
