/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::allocator::RawAllocator;
use crate::error::{AllocError, ArrayError};
use alloc::alloc::{handle_alloc_error, Layout};
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

/// An owned block of `cap` uninitialized slots of `T`.
///
/// The buffer knows nothing about which slots are initialized: dropping it frees the block
/// without dropping any element.  When `cap == 0` nothing is allocated and `ptr` is dangling.
/// Zero-sized types never allocate, but their capacity is still tracked.
pub(crate) struct RawBuffer<T, A>
where
    A: RawAllocator,
{
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _phantom_t: PhantomData<T>,
}

// SAFETY: the buffer owns its block exclusively.
unsafe impl<T: Send, A: RawAllocator + Send> Send for RawBuffer<T, A> {}
// SAFETY: shared access only hands out shared references to the elements.
unsafe impl<T: Sync, A: RawAllocator + Sync> Sync for RawBuffer<T, A> {}

impl<T, A> RawBuffer<T, A>
where
    A: RawAllocator,
{
    pub(crate) const fn new_in(alloc: A) -> RawBuffer<T, A> {
        RawBuffer { ptr: NonNull::dangling(), cap: 0, alloc, _phantom_t: PhantomData }
    }

    pub(crate) fn try_with_capacity_in(cap: usize, alloc: A) -> Result<RawBuffer<T, A>, ArrayError> {
        let mut buffer = RawBuffer::new_in(alloc);

        buffer.ptr = buffer.allocate(cap)?;
        buffer.cap = cap;

        Ok(buffer)
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The block, or `None` if nothing is reserved.
    #[inline]
    pub(crate) fn block(&self) -> Option<NonNull<T>> {
        if self.cap == 0 {
            None
        } else {
            Some(self.ptr)
        }
    }

    fn layout(cap: usize) -> Result<Layout, ArrayError> {
        Layout::array::<T>(cap).map_err(|_| ArrayError::CapacityOverflow)
    }

    fn allocate(&self, cap: usize) -> Result<NonNull<T>, ArrayError> {
        if cap == 0 || mem::size_of::<T>() == 0 {
            return Ok(NonNull::dangling());
        }

        let layout = RawBuffer::<T, A>::layout(cap)?;

        self.alloc
            .allocate(layout)
            .map(NonNull::cast)
            .map_err(|AllocError| ArrayError::AllocFailed { size: layout.size(), align: layout.align() })
    }

    /// Moves the first `len` slots into a new block of exactly `new_cap` slots and frees the old
    /// block.  If the new block cannot be obtained the buffer is left untouched.
    ///
    /// # Safety
    ///
    /// The first `len` slots must be initialized and `len <= new_cap`.
    pub(crate) unsafe fn try_reallocate(&mut self, len: usize, new_cap: usize) -> Result<(), ArrayError> {
        debug_assert!(len <= new_cap && len <= self.cap);

        let new_ptr = self.allocate(new_cap)?;

        // SAFETY: both blocks hold at least `len` slots and are distinct allocations.  Moving
        // the bits transfers ownership of the elements, which cannot fail.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len) };

        self.release();
        self.ptr = new_ptr;
        self.cap = new_cap;

        Ok(())
    }

    /// Frees the block.  The elements in it, if any, are forgotten.
    pub(crate) fn release(&mut self) {
        if self.cap != 0 && mem::size_of::<T>() != 0 {
            // SAFETY: this layout was validated by `Layout::array` when the block was allocated.
            let layout = unsafe {
                Layout::from_size_align_unchecked(mem::size_of::<T>() * self.cap, mem::align_of::<T>())
            };

            // SAFETY: the block came from this allocator with this layout.
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
        }

        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T, A> Drop for RawBuffer<T, A>
where
    A: RawAllocator,
{
    fn drop(&mut self) {
        self.release();
    }
}

/// Turns the error of an operation that can only fail to allocate into the conventional panic
/// or allocation-failure handler, as the infallible methods of `Vec` do.
pub(crate) fn handle_reserve<R>(result: Result<R, ArrayError>) -> R {
    match result {
        Ok(r) => r,
        Err(ArrayError::AllocFailed { size, align }) => match Layout::from_size_align(size, align) {
            Ok(layout) => handle_alloc_error(layout),
            Err(_) => panic!("capacity overflow"),
        },
        Err(err) => panic!("{err}"),
    }
}
