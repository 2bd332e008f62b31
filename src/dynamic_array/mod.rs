/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

mod raw;
#[cfg(feature = "rayon")]
mod rayon;

use crate::allocator::{Global, RawAllocator};
use crate::error::ArrayError;
use alloc::vec::Vec;
use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};
use core::iter::{FromIterator, FusedIterator};
use core::mem::{self, ManuallyDrop};
use core::ops::{Bound, Index, IndexMut, RangeBounds};
use core::ptr::{self, NonNull};
use core::slice::{self, SliceIndex};
use raw::{handle_reserve, RawBuffer};

pub type Iter<'a, T> = slice::Iter<'a, T>;
pub type IterMut<'a, T> = slice::IterMut<'a, T>;

/// Creates a [`DynamicArray`](crate::DynamicArray) containing the given arguments, with a
/// capacity of exactly the number of arguments:
///
/// ```
/// # use dynarray::*;
/// #
/// let mut a = DynamicArray::new();
///
/// a.push_back(1);
/// a.push_back(2);
/// a.push_back(3);
///
/// assert_eq!(dynamic_array![1, 2, 3], a);
/// assert_eq!(dynamic_array![1, 2, 3].capacity(), 3);
/// assert_eq!(dynamic_array![7; 5], [7, 7, 7, 7, 7]);
/// ```
#[macro_export]
macro_rules! dynamic_array {
    () => {
        $crate::DynamicArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynamicArray::from_elem($elem, $n)
    };
    ($($e:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($e),+])
    };
}

/// A contiguous growable array with an injectable allocator.
///
/// The array owns a single block of `capacity()` slots.  The first `len()` slots hold live
/// elements, the rest are uninitialized and never observable.  A default-constructed array
/// does not allocate.
///
/// # Complexity
///
/// Let *n* be the number of elements in the array.
///
/// ## Temporal complexity
///
/// | Operation                   | Average | Worst case  |
/// |:--------------------------- | -------:| -----------:|
/// | `new()`                     |    Θ(1) |        Θ(1) |
/// | `push_back()`               |    Θ(1) |        Θ(n) |
/// | `pop_back()`                |    Θ(1) |        Θ(1) |
/// | `at()`/`get()`/`[]`         |    Θ(1) |        Θ(1) |
/// | `insert()`                  |    Θ(n) |        Θ(n) |
/// | `erase()`                   |    Θ(n) |        Θ(n) |
/// | `reserve()`                 |    Θ(n) |        Θ(n) |
/// | `swap()`                    |    Θ(1) |        Θ(1) |
/// | `len()`/`capacity()`        |    Θ(1) |        Θ(1) |
/// | `clone()`                   |    Θ(n) |        Θ(n) |
/// | iterator step               |    Θ(1) |        Θ(1) |
///
/// # Growth
///
/// When a single element does not fit, the capacity becomes `max(1, 2 * capacity)`, so *n*
/// appends perform Θ(log(n)) reallocations and Θ(n) element moves in total.  Bulk insertions
/// grow to exactly the required capacity, and [`reserve()`](DynamicArray::reserve) is always
/// exact.  Capacity never shrinks unless [`shrink_to_fit()`](DynamicArray::shrink_to_fit) is
/// called.
///
/// # Invalidation
///
/// Positions are plain indices.  An index obtained before a reallocation stays a valid index,
/// but references into the array cannot outlive a mutation: the borrow checker rejects any use
/// of a reference across `push_back()`, `insert()`, `erase()` and friends.  After an insertion
/// or erasure at a position `p`, every index `>= p` denotes a different element.
///
/// # Panic safety
///
/// Moving elements between blocks cannot fail, so growth never loses an element.  The
/// operations that stage their work before committing leave the array exactly as it was when
/// they fail or when a user callback panics: `reserve()`, `push_back()`, `insert()`,
/// `insert_n()`, `insert_slice()` and `insert_iter()` (the capacity may have grown).  The other
/// operations leave a consistent array whose content is documented on each method.
pub struct DynamicArray<T, A = Global>
where
    A: RawAllocator,
{
    buf: RawBuffer<T, A>,
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array.  Nothing is allocated.
    #[must_use]
    pub const fn new() -> DynamicArray<T> {
        DynamicArray::new_in(Global)
    }

    /// Creates an empty array with exactly `capacity` reserved slots.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts if the allocation fails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> DynamicArray<T> {
        DynamicArray::with_capacity_in(capacity, Global)
    }

    pub fn try_with_capacity(capacity: usize) -> Result<DynamicArray<T>, ArrayError> {
        DynamicArray::try_with_capacity_in(capacity, Global)
    }

    /// Builds an array from an iterator that must yield exactly `len` elements.
    ///
    /// Fails with [`ArrayError::LengthMismatch`] otherwise.  A source that is too long is read
    /// up to one element past `len`, so the reported length is then `len + 1`.  A source whose
    /// size hint is already too small fails before anything is allocated.
    pub fn from_exact_iter<I>(len: usize, iter: I) -> Result<DynamicArray<T>, ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        DynamicArray::from_exact_iter_in(len, iter, Global)
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Creates an array holding `count` copies of `value`, with a capacity of exactly `count`.
    #[must_use]
    pub fn from_elem(value: T, count: usize) -> DynamicArray<T> {
        DynamicArray::from_elem_in(value, count, Global)
    }

    #[must_use]
    pub fn from_slice(values: &[T]) -> DynamicArray<T> {
        let mut array = DynamicArray::with_capacity(values.len());
        array.extend_from_slice(values);
        array
    }
}

impl<T, A> DynamicArray<T, A>
where
    A: RawAllocator,
{
    #[must_use]
    pub const fn new_in(alloc: A) -> DynamicArray<T, A> {
        DynamicArray { buf: RawBuffer::new_in(alloc), len: 0 }
    }

    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> DynamicArray<T, A> {
        handle_reserve(DynamicArray::try_with_capacity_in(capacity, alloc))
    }

    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<DynamicArray<T, A>, ArrayError> {
        Ok(DynamicArray { buf: RawBuffer::try_with_capacity_in(capacity, alloc)?, len: 0 })
    }

    pub fn from_exact_iter_in<I>(len: usize, iter: I, alloc: A) -> Result<DynamicArray<T, A>, ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut iter = iter.into_iter();

        if let Some(upper) = iter.size_hint().1 {
            if upper < len {
                return Err(ArrayError::LengthMismatch { expected: len, actual: iter.count() });
            }
        }

        let mut array = DynamicArray::try_with_capacity_in(len, alloc)?;

        for elem in iter.by_ref().take(len) {
            array.push_within_capacity(elem);
        }

        if array.len() < len {
            return Err(ArrayError::LengthMismatch { expected: len, actual: array.len() });
        }

        match iter.next() {
            None => Ok(array),
            Some(_) => Err(ArrayError::LengthMismatch { expected: len, actual: len + 1 }),
        }
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns a pointer to the first slot of the buffer, or `None` if no storage is reserved
    /// (which is the case exactly when the capacity is zero).
    ///
    /// The pointer is valid for reads of `len()` elements until the next mutation.
    #[must_use]
    pub fn data(&self) -> Option<NonNull<T>> {
        self.buf.block()
    }

    /// Returns a raw pointer to the buffer.  It is dangling when the capacity is zero.
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    #[must_use]
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    // Capacity.

    /// Reserves storage for a total of `new_capacity` elements.
    ///
    /// Unlike `Vec::reserve()` the argument is the total capacity, not the number of additional
    /// elements, and the reservation is exact.  Does nothing if `new_capacity <= capacity()`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts if the allocation fails.
    pub fn reserve(&mut self, new_capacity: usize) {
        handle_reserve(self.try_reserve(new_capacity));
    }

    /// Fallible version of [`reserve()`](DynamicArray::reserve).  On error the array is
    /// unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        // SAFETY: the first `len` slots are initialized and `len <= new_capacity`.
        unsafe { self.buf.try_reallocate(self.len, new_capacity) }
    }

    /// Reduces the capacity to exactly `len()`.  An empty array releases its storage.
    pub fn shrink_to_fit(&mut self) {
        handle_reserve(self.try_shrink_to_fit());
    }

    pub fn try_shrink_to_fit(&mut self) -> Result<(), ArrayError> {
        if self.len == self.capacity() {
            return Ok(());
        }

        // SAFETY: the first `len` slots are initialized.
        unsafe { self.buf.try_reallocate(self.len, self.len) }
    }

    /// Makes room for `additional` more elements, doubling the capacity if it is not enough.
    fn grow_amortized(&mut self, additional: usize) -> Result<(), ArrayError> {
        let required = self.len.checked_add(additional).ok_or(ArrayError::CapacityOverflow)?;

        if required <= self.capacity() {
            return Ok(());
        }

        let doubled = self.capacity().saturating_mul(2).max(1);

        self.try_reserve(required.max(doubled))
    }

    /// Makes room for exactly `additional` more elements.
    fn grow_exact(&mut self, additional: usize) -> Result<(), ArrayError> {
        let required = self.len.checked_add(additional).ok_or(ArrayError::CapacityOverflow)?;

        self.try_reserve(required)
    }

    /// Shortens the array to `len` elements, dropping the rest.  Does nothing if the array is
    /// not longer than `len`.  The capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        // SAFETY: slots `len..self.len` are initialized.  The length is updated first so that a
        // panicking destructor cannot lead to a double drop.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), self.len - len);
            self.len = len;
            ptr::drop_in_place(tail);
        }
    }

    /// Resizes the array to `count` elements, creating new elements with `f`.
    ///
    /// When growing past the capacity, the capacity becomes `max(count, 2 * capacity())`.  If
    /// `f` panics, the elements created so far are kept.
    pub fn resize_with<F>(&mut self, count: usize, f: F)
    where
        F: FnMut() -> T,
    {
        handle_reserve(self.try_resize_with(count, f));
    }

    pub fn try_resize_with<F>(&mut self, count: usize, mut f: F) -> Result<(), ArrayError>
    where
        F: FnMut() -> T,
    {
        if count <= self.len {
            self.truncate(count);
            return Ok(());
        }

        if count > self.capacity() {
            let doubled = self.capacity().saturating_mul(2);
            self.try_reserve(count.max(doubled))?;
        }

        while self.len < count {
            self.push_within_capacity(f());
        }

        Ok(())
    }

    // Element access.

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be smaller than `len()`.
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        // SAFETY: guaranteed by the caller.
        unsafe { &*self.as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be smaller than `len()`.
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: guaranteed by the caller.
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    /// Checked access: fails with [`ArrayError::OutOfRange`] if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let len = self.len;
        self.get(index).ok_or(ArrayError::OutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let len = self.len;
        self.get_mut(index).ok_or(ArrayError::OutOfRange { index, len })
    }

    #[must_use]
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        match self.len {
            0 => None,
            n => self.get(n - 1),
        }
    }

    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        match self.len {
            0 => None,
            n => self.get_mut(n - 1),
        }
    }

    // Structural mutation.

    /// Appends an element, growing the buffer if it is full.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts if the allocation fails.
    pub fn push_back(&mut self, value: T) {
        handle_reserve(self.try_push_back(value));
    }

    /// Fallible version of [`push_back()`](DynamicArray::push_back).  On error `value` is
    /// dropped and the array is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<(), ArrayError> {
        if self.len == self.capacity() {
            self.grow_amortized(1)?;
        }

        self.push_within_capacity(value);

        Ok(())
    }

    /// Appends the element returned by `f` and returns a reference to it.
    ///
    /// The buffer grows before `f` is called, so if `f` panics the array keeps its content.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts if the allocation fails.
    pub fn emplace_back_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.len == self.capacity() {
            handle_reserve(self.grow_amortized(1));
        }

        self.push_within_capacity(f());

        // SAFETY: the element was just written to slot `len - 1`.
        unsafe { &mut *self.as_mut_ptr().add(self.len - 1) }
    }

    #[inline]
    fn push_within_capacity(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());

        // SAFETY: slot `len` is reserved and uninitialized.
        unsafe { ptr::write(self.as_mut_ptr().add(self.len), value) };
        self.len += 1;
    }

    /// Removes the last element and returns it, or `None` if the array is empty.  The capacity
    /// is unchanged.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: slot `len` was initialized and is no longer counted.
            Some(unsafe { ptr::read(self.as_ptr().add(self.len)) })
        }
    }

    fn check_insert_position(&self, position: usize) -> Result<(), ArrayError> {
        if position > self.len {
            Err(ArrayError::InvalidPosition { position, len: self.len })
        } else {
            Ok(())
        }
    }

    /// Inserts `value` at `position`, shifting the elements at and after it to the right.
    ///
    /// `position` may be `len()`, which appends.  Returns the position of the inserted element.
    /// Fails with [`ArrayError::InvalidPosition`] if `position > len()`, or with an allocation
    /// error; in both cases the array is unchanged.
    pub fn insert(&mut self, position: usize, value: T) -> Result<usize, ArrayError> {
        self.check_insert_position(position)?;

        if self.len == self.capacity() {
            self.grow_amortized(1)?;
        }

        // SAFETY: there is a free slot after the last element, and `position <= len`.
        unsafe {
            let p = self.as_mut_ptr().add(position);
            ptr::copy(p, p.add(1), self.len - position);
            ptr::write(p, value);
        }
        self.len += 1;

        Ok(position)
    }

    /// Inserts the element returned by `f` at `position` and returns a reference to it.
    ///
    /// Fails like [`insert()`](DynamicArray::insert), before `f` is called.  If `f` panics the
    /// array keeps its content.
    pub fn emplace_with<F>(&mut self, position: usize, f: F) -> Result<&mut T, ArrayError>
    where
        F: FnOnce() -> T,
    {
        self.check_insert_position(position)?;

        if self.len == self.capacity() {
            self.grow_amortized(1)?;
        }

        let value = f();

        self.insert(position, value)?;

        // SAFETY: `position < len` after the insertion.
        Ok(unsafe { &mut *self.as_mut_ptr().add(position) })
    }

    /// Removes the element at `position` and returns it, shifting the following elements to the
    /// left.  Fails with [`ArrayError::InvalidPosition`] if `position >= len()`.
    pub fn remove(&mut self, position: usize) -> Result<T, ArrayError> {
        if position >= self.len {
            return Err(ArrayError::InvalidPosition { position, len: self.len });
        }

        // SAFETY: `position < len`, so the slot is initialized and the tail is in bounds.
        unsafe {
            let p = self.as_mut_ptr().add(position);
            let removed = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - position - 1);
            self.len -= 1;
            Ok(removed)
        }
    }

    /// Drops the element at `position`, shifting the following elements to the left.
    ///
    /// Returns the position of the element that now occupies the erased slot, which is `len()`
    /// if the last element was erased.  The capacity is unchanged.
    pub fn erase(&mut self, position: usize) -> Result<usize, ArrayError> {
        self.remove(position).map(|_| position)
    }

    /// Drops the elements in `range`, shifting the following elements to the left, and returns
    /// the start of the range.
    ///
    /// If a destructor panics the remaining elements of the range are still dropped, and the
    /// elements after the range are kept.
    pub fn erase_range<R>(&mut self, range: R) -> Result<usize, ArrayError>
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len,
        };

        if start > end || end > self.len {
            return Err(ArrayError::InvalidRange { start, end, len: self.len });
        }

        let tail = self.len - end;
        let base = self.as_mut_ptr();

        self.len = start;

        let shift = TailShift { array: self, from: end, to: start, tail };

        // SAFETY: slots `start..end` are initialized and no longer counted.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start)) };

        drop(shift);

        Ok(start)
    }

    /// Drops all elements.  The capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges the contents, capacities and allocators of two arrays without touching any
    /// element.
    pub fn swap(&mut self, other: &mut DynamicArray<T, A>) {
        mem::swap(self, other);
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, A> DynamicArray<T, A>
where
    A: RawAllocator + Clone,
{
    /// Moves the content out, leaving this array empty with no storage.
    #[must_use]
    pub fn take(&mut self) -> DynamicArray<T, A> {
        let empty = DynamicArray::new_in(self.allocator().clone());
        mem::replace(self, empty)
    }

    /// Inserts the elements of `iter` at `position`, preserving their order, and returns the
    /// position of the first inserted element.
    ///
    /// The elements are first collected into a staging buffer, so if the iterator panics or an
    /// allocation fails the array is unchanged.
    pub fn insert_iter<I>(&mut self, position: usize, iter: I) -> Result<usize, ArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_insert_position(position)?;

        let iter = iter.into_iter();
        let mut staged = DynamicArray::new_in(self.allocator().clone());

        staged.try_reserve(iter.size_hint().0)?;
        for elem in iter {
            staged.try_push_back(elem)?;
        }

        self.insert_staged(position, staged)
    }

    fn insert_staged(&mut self, position: usize, mut staged: DynamicArray<T, A>) -> Result<usize, ArrayError> {
        let count = staged.len();

        self.grow_exact(count)?;

        // SAFETY: there are `count` free slots after the last element.  The staged elements are
        // moved into the gap and forgotten by `staged`.
        unsafe {
            let p = self.as_mut_ptr().add(position);
            ptr::copy(p, p.add(count), self.len - position);
            ptr::copy_nonoverlapping(staged.as_ptr(), p, count);
            staged.len = 0;
        }
        self.len += count;

        Ok(position)
    }

    /// Replaces the content with the elements of `iter`, reusing the buffer when it is large
    /// enough.  If the iterator panics the array keeps the elements yielded so far.
    pub fn assign_iter<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.extend(iter);
    }
}

impl<T: Clone, A> DynamicArray<T, A>
where
    A: RawAllocator,
{
    #[must_use]
    pub fn from_elem_in(value: T, count: usize, alloc: A) -> DynamicArray<T, A> {
        let mut array = DynamicArray::with_capacity_in(count, alloc);

        if count > 0 {
            for _ in 1..count {
                array.push_within_capacity(value.clone());
            }
            array.push_within_capacity(value);
        }

        array
    }

    /// Deep copy that reports allocation failure instead of aborting.  The copy has the same
    /// capacity as `self`.
    pub fn try_clone(&self) -> Result<DynamicArray<T, A>, ArrayError>
    where
        A: Clone,
    {
        let mut array = DynamicArray::try_with_capacity_in(self.capacity(), self.allocator().clone())?;

        for elem in self {
            array.push_within_capacity(elem.clone());
        }

        Ok(array)
    }

    /// Resizes the array to `count` elements, filling new slots with clones of `value`.
    pub fn resize(&mut self, count: usize, value: T) {
        self.resize_with(count, || value.clone());
    }

    /// Opens a gap of `count` slots at `position` and fills it with `fill`.
    fn insert_cloned<F>(&mut self, position: usize, count: usize, fill: F) -> Result<usize, ArrayError>
    where
        F: FnOnce(&mut InsertGap<'_, T, A>),
    {
        self.check_insert_position(position)?;
        self.grow_exact(count)?;

        // SAFETY: there are `count` free slots after the last element and `position <= len`.
        let mut gap = unsafe { InsertGap::open(self, position, count) };
        fill(&mut gap);
        gap.close();

        Ok(position)
    }

    /// Inserts `count` copies of `value` at `position` and returns `position`.
    ///
    /// If a clone panics the array is unchanged.
    pub fn insert_n(&mut self, position: usize, count: usize, value: T) -> Result<usize, ArrayError> {
        self.insert_cloned(position, count, |gap| {
            if count > 0 {
                for _ in 1..count {
                    gap.fill(value.clone());
                }
                gap.fill(value);
            }
        })
    }

    /// Inserts clones of `values` at `position` and returns `position`.
    ///
    /// If a clone panics the array is unchanged.
    pub fn insert_slice(&mut self, position: usize, values: &[T]) -> Result<usize, ArrayError> {
        self.insert_cloned(position, values.len(), |gap| {
            for value in values {
                gap.fill(value.clone());
            }
        })
    }

    /// Appends clones of `values`, growing to exactly the required capacity.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        let len = self.len;
        handle_reserve(self.insert_slice(len, values));
    }

    /// Replaces the content with `count` copies of `value`.  The buffer is reused if it can hold
    /// `count` elements, otherwise it is replaced by one of exactly `count` slots.
    pub fn assign(&mut self, count: usize, value: T) {
        self.clear();
        self.reserve(count);
        self.resize(count, value);
    }

    /// Replaces the content with clones of `values`, like [`assign()`](DynamicArray::assign).
    pub fn assign_slice(&mut self, values: &[T]) {
        self.clear();
        self.reserve(values.len());
        self.extend_from_slice(values);
    }
}

impl<T: Default, A> DynamicArray<T, A>
where
    A: RawAllocator,
{
    /// Resizes the array to `count` elements, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, count: usize) {
        self.resize_with(count, T::default);
    }
}

/// A gap of uninitialized slots opened in the middle of an array, with the old tail parked
/// right after it.  While the gap is open the array only counts the elements before it.
///
/// Dropping an unclosed gap (which only happens while unwinding) drops what was filled in and
/// moves the tail back, restoring the original content.
struct InsertGap<'a, T, A>
where
    A: RawAllocator,
{
    array: &'a mut DynamicArray<T, A>,
    position: usize,
    count: usize,
    filled: usize,
    old_len: usize,
}

impl<'a, T, A> InsertGap<'a, T, A>
where
    A: RawAllocator,
{
    /// # Safety
    ///
    /// `position <= array.len()` and the array must have room for `count` more elements.
    unsafe fn open(array: &'a mut DynamicArray<T, A>, position: usize, count: usize) -> InsertGap<'a, T, A> {
        let old_len = array.len;

        debug_assert!(position <= old_len && old_len + count <= array.capacity());

        // SAFETY: guaranteed by the caller.
        unsafe {
            let p = array.as_mut_ptr().add(position);
            ptr::copy(p, p.add(count), old_len - position);
        }
        array.len = position;

        InsertGap { array, position, count, filled: 0, old_len }
    }

    fn fill(&mut self, value: T) {
        assert!(self.filled < self.count, "insert gap overflow");

        // SAFETY: the slot is inside the gap and uninitialized.
        unsafe { ptr::write(self.array.as_mut_ptr().add(self.position + self.filled), value) };
        self.filled += 1;
    }

    fn close(self) {
        assert_eq!(self.filled, self.count, "insert gap not filled");

        self.array.len = self.old_len + self.count;
        mem::forget(self);
    }
}

impl<'a, T, A> Drop for InsertGap<'a, T, A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        // SAFETY: the first `filled` slots of the gap are initialized, and the tail sits right
        // after the gap.
        unsafe {
            let p = self.array.as_mut_ptr().add(self.position);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(p, self.filled));
            ptr::copy(p.add(self.count), p, self.old_len - self.position);
        }
        self.array.len = self.old_len;
    }
}

/// Moves `tail` elements from `from` to `to` when dropped, and makes them count again.
struct TailShift<'a, T, A>
where
    A: RawAllocator,
{
    array: &'a mut DynamicArray<T, A>,
    from: usize,
    to: usize,
    tail: usize,
}

impl<'a, T, A> Drop for TailShift<'a, T, A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        // SAFETY: `from..from + tail` are initialized slots and `to <= from`.
        unsafe {
            let base = self.array.as_mut_ptr();
            ptr::copy(base.add(self.from), base.add(self.to), self.tail);
        }
        self.array.len = self.to + self.tail;
    }
}

impl<T, A> Drop for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        // SAFETY: the first `len` slots are initialized.  The block is freed by `buf`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len)) }
    }
}

impl<T, A, I> Index<I> for DynamicArray<T, A>
where
    A: RawAllocator,
    I: SliceIndex<[T]>,
{
    type Output = I::Output;

    fn index(&self, index: I) -> &I::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, A, I> IndexMut<I> for DynamicArray<T, A>
where
    A: RawAllocator,
    I: SliceIndex<[T]>,
{
    fn index_mut(&mut self, index: I) -> &mut I::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, A> Default for DynamicArray<T, A>
where
    A: RawAllocator + Default,
{
    fn default() -> DynamicArray<T, A> {
        DynamicArray::new_in(A::default())
    }
}

impl<T: Clone, A> Clone for DynamicArray<T, A>
where
    A: RawAllocator + Clone,
{
    fn clone(&self) -> DynamicArray<T, A> {
        handle_reserve(self.try_clone())
    }

    /// Reuses the buffer of `self` when it is large enough.
    fn clone_from(&mut self, source: &DynamicArray<T, A>) {
        self.truncate(source.len());

        let (init, tail) = source.as_slice().split_at(self.len());

        self.as_mut_slice().clone_from_slice(init);
        self.extend_from_slice(tail);
    }
}

impl<T: PartialEq<U>, U, A, B> PartialEq<DynamicArray<U, B>> for DynamicArray<T, A>
where
    A: RawAllocator,
    B: RawAllocator,
{
    fn eq(&self, other: &DynamicArray<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, A> PartialEq<[U]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A> PartialEq<&[U]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, A, const N: usize> PartialEq<[U; N]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A> PartialEq<Vec<U>> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A> Eq for DynamicArray<T, A> where A: RawAllocator {}

impl<T: PartialOrd<U>, U, A, B> PartialOrd<DynamicArray<U, B>> for DynamicArray<T, A>
where
    A: RawAllocator,
    B: RawAllocator,
{
    fn partial_cmp(&self, other: &DynamicArray<U, B>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A> Ord for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn cmp(&self, other: &DynamicArray<T, A>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A> Hash for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Add the hash of length so that if two collections are added one after the other it doesn't
        // hash to the same thing as a single collection with the same elements in the same order.
        self.len().hash(state);

        for e in self {
            e.hash(state);
        }
    }
}

impl<T: fmt::Debug, A> fmt::Debug for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Display, A> Display for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        fmt.write_str("[")?;

        for v in self {
            if !first {
                fmt.write_str(", ")?;
            }
            v.fmt(fmt)?;
            first = false;
        }

        fmt.write_str("]")
    }
}

impl<T, A> AsRef<[T]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A> AsMut<[T]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A> Borrow<[T]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A> BorrowMut<[T]> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> DynamicArray<T> {
        let mut array = DynamicArray::with_capacity(N);

        for value in values {
            array.push_within_capacity(value);
        }

        array
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(values: &[T]) -> DynamicArray<T> {
        DynamicArray::from_slice(values)
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(values: Vec<T>) -> DynamicArray<T> {
        let mut array = DynamicArray::with_capacity(values.len());

        for value in values {
            array.push_within_capacity(value);
        }

        array
    }
}

impl<T, A> From<DynamicArray<T, A>> for Vec<T>
where
    A: RawAllocator,
{
    fn from(array: DynamicArray<T, A>) -> Vec<T> {
        array.into_iter().collect()
    }
}

impl<T, A> FromIterator<T> for DynamicArray<T, A>
where
    A: RawAllocator + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(into_iter: I) -> DynamicArray<T, A> {
        let mut array = DynamicArray::default();
        array.extend(into_iter);
        array
    }
}

impl<T, A> Extend<T> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    /// Reserves exactly the lower bound of the iterator's size hint up front, then grows by
    /// doubling for whatever the iterator yields beyond it.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        handle_reserve(self.grow_exact(iter.size_hint().0));

        for elem in iter {
            self.push_back(elem);
        }
    }
}

impl<'a, T: Copy + 'a, A> Extend<&'a T> for DynamicArray<T, A>
where
    A: RawAllocator,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T, A> IntoIterator for &'a DynamicArray<T, A>
where
    A: RawAllocator,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A> IntoIterator for &'a mut DynamicArray<T, A>
where
    A: RawAllocator,
{
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T, A> IntoIterator for DynamicArray<T, A>
where
    A: RawAllocator,
{
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        let array = ManuallyDrop::new(self);
        // SAFETY: `array` is never dropped, so the buffer is moved out exactly once.
        let buf = unsafe { ptr::read(&array.buf) };

        IntoIter { buf, start: 0, end: array.len }
    }
}

/// An iterator that moves the elements out of a [`DynamicArray`].
///
/// Elements that are not consumed are dropped together with the iterator, which then returns
/// the buffer to the array's allocator.
pub struct IntoIter<T, A = Global>
where
    A: RawAllocator,
{
    buf: RawBuffer<T, A>,
    start: usize, // inclusive
    end: usize,   // exclusive
}

impl<T, A> IntoIter<T, A>
where
    A: RawAllocator,
{
    /// The elements not yet yielded.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `start..end` are initialized.
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T, A> Iterator for IntoIter<T, A>
where
    A: RawAllocator,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            // SAFETY: slot `start` is initialized and is read exactly once.
            let elem = unsafe { ptr::read(self.buf.ptr().add(self.start)) };
            self.start += 1;
            Some(elem)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T, A> DoubleEndedIterator for IntoIter<T, A>
where
    A: RawAllocator,
{
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            self.end -= 1;
            // SAFETY: slot `end` is initialized and is read exactly once.
            Some(unsafe { ptr::read(self.buf.ptr().add(self.end)) })
        }
    }
}

impl<T, A> ExactSizeIterator for IntoIter<T, A> where A: RawAllocator {}

impl<T, A> FusedIterator for IntoIter<T, A> where A: RawAllocator {}

impl<T: fmt::Debug, A> fmt::Debug for IntoIter<T, A>
where
    A: RawAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A> Drop for IntoIter<T, A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        // SAFETY: slots `start..end` are initialized and were not yielded.
        unsafe {
            let remaining = ptr::slice_from_raw_parts_mut(self.buf.ptr().add(self.start), self.end - self.start);
            self.start = self.end;
            ptr::drop_in_place(remaining);
        }
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use ::serde::ser::{Serialize, Serializer};
    use core::marker::PhantomData;

    /// Upper bound on the capacity reserved from an untrusted size hint.
    const MAX_PREALLOCATION: usize = 4096;

    impl<T, A> Serialize for DynamicArray<T, A>
    where
        T: Serialize,
        A: RawAllocator,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self)
        }
    }

    impl<'de, T, A> Deserialize<'de> for DynamicArray<T, A>
    where
        T: Deserialize<'de>,
        A: RawAllocator + Default,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<DynamicArray<T, A>, D::Error> {
            deserializer.deserialize_seq(DynamicArrayVisitor { _phantom_t: PhantomData, _phantom_a: PhantomData })
        }
    }

    struct DynamicArrayVisitor<T, A> {
        _phantom_t: PhantomData<T>,
        _phantom_a: PhantomData<A>,
    }

    impl<'de, T, A> Visitor<'de> for DynamicArrayVisitor<T, A>
    where
        T: Deserialize<'de>,
        A: RawAllocator + Default,
    {
        type Value = DynamicArray<T, A>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a sequence")
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<DynamicArray<T, A>, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATION);
            let mut array = DynamicArray::try_with_capacity_in(capacity, A::default())
                .map_err(::serde::de::Error::custom)?;

            while let Some(value) = seq.next_element()? {
                array.try_push_back(value).map_err(::serde::de::Error::custom)?;
            }

            Ok(array)
        }
    }
}
