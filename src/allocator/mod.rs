/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Allocation strategies for the containers of this crate.
//!
//! Containers never call the global allocator directly.  They are parameterized over a
//! [`RawAllocator`] which they store and use for every block they own, so that a different
//! strategy (for instance a [`TrackingAllocator`] that fails on demand) can be injected.

use crate::error::AllocError;
use alloc::alloc::{alloc, dealloc, Layout};
use archery::{ArcTK, RcK, SharedPointer, SharedPointerKind};
use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A source of raw memory blocks.
///
/// # Safety
///
/// A block returned by `allocate` must be valid for reads and writes of `layout.size()` bytes,
/// be aligned to `layout.align()`, and stay valid until it is passed to `deallocate` of the same
/// allocator or of one of its clones.
pub unsafe trait RawAllocator {
    /// Allocates a block for `layout`.  Containers never request zero-sized layouts.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` of this allocator (or a clone of it) with
    /// the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global heap, as used by `Box` and `Vec`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl RawAllocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized allocation requested");

        // SAFETY: the layout has a non-zero size.
        NonNull::new(unsafe { alloc(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: guaranteed by the caller.
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

const UNLIMITED: usize = usize::MAX;

#[derive(Debug)]
struct Counters {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
    failures: AtomicUsize,
    /// Number of allocations still granted before requests start failing.
    budget: AtomicUsize,
}

impl Counters {
    fn new() -> Counters {
        Counters {
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            budget: AtomicUsize::new(UNLIMITED),
        }
    }
}

/// An allocator that forwards to [`Global`] while recording every request, and that can be
/// told to refuse requests.
///
/// Clones share their counters, so a clone handed to a container can be inspected from the
/// outside.  The counters live behind a [`SharedPointer`]; use [`TrackingAllocatorSync`] when
/// the allocator (and thus the container holding it) has to cross threads.
///
/// # Example
///
/// ```rust
/// use dynarray::{ArrayError, DynamicArray, TrackingAllocator};
///
/// let allocator = TrackingAllocator::new();
/// let mut array: DynamicArray<u32, _> = DynamicArray::new_in(allocator.clone());
///
/// assert_eq!(allocator.allocations(), 0);
///
/// array.push_back(1);
/// assert_eq!(allocator.live_blocks(), 1);
///
/// allocator.fail_after(0);
/// assert!(matches!(array.try_reserve(100), Err(ArrayError::AllocFailed { .. })));
/// assert_eq!(array.capacity(), 1);
/// ```
pub struct TrackingAllocator<P = RcK>
where
    P: SharedPointerKind,
{
    counters: SharedPointer<Counters, P>,
}

pub type TrackingAllocatorSync = TrackingAllocator<ArcTK>;

impl TrackingAllocator {
    #[must_use]
    pub fn new() -> TrackingAllocator {
        TrackingAllocator::new_with_ptr_kind()
    }
}

impl TrackingAllocatorSync {
    #[must_use]
    pub fn new_sync() -> TrackingAllocatorSync {
        TrackingAllocator::new_with_ptr_kind()
    }
}

impl<P> TrackingAllocator<P>
where
    P: SharedPointerKind,
{
    #[must_use]
    pub fn new_with_ptr_kind() -> TrackingAllocator<P> {
        TrackingAllocator { counters: SharedPointer::new(Counters::new()) }
    }

    /// Grants `successes` more allocations, then refuses every request until
    /// [`never_fail()`](TrackingAllocator::never_fail) is called.
    pub fn fail_after(&self, successes: usize) {
        self.counters.budget.store(successes, Ordering::SeqCst);
    }

    /// Grants every request from now on.
    pub fn never_fail(&self) {
        self.counters.budget.store(UNLIMITED, Ordering::SeqCst);
    }

    /// Number of successful allocations.
    #[must_use]
    pub fn allocations(&self) -> usize {
        self.counters.allocations.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn deallocations(&self) -> usize {
        self.counters.deallocations.load(Ordering::SeqCst)
    }

    /// Number of refused allocation requests.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.counters.failures.load(Ordering::SeqCst)
    }

    /// Blocks handed out and not yet returned.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    #[must_use]
    pub fn live_bytes(&self) -> usize {
        self.counters.live_bytes.load(Ordering::SeqCst)
    }

    fn take_from_budget(&self) -> bool {
        self.counters
            .budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |budget| match budget {
                UNLIMITED => Some(UNLIMITED),
                0 => None,
                budget => Some(budget - 1),
            })
            .is_ok()
    }
}

unsafe impl<P> RawAllocator for TrackingAllocator<P>
where
    P: SharedPointerKind,
{
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if !self.take_from_budget() {
            self.counters.failures.fetch_add(1, Ordering::SeqCst);
            return Err(AllocError);
        }

        let ptr = Global.allocate(layout)?;

        self.counters.allocations.fetch_add(1, Ordering::SeqCst);
        self.counters.live_bytes.fetch_add(layout.size(), Ordering::SeqCst);

        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: the block was allocated by `Global` on behalf of this allocator.
        unsafe { Global.deallocate(ptr, layout) };

        self.counters.deallocations.fetch_add(1, Ordering::SeqCst);
        self.counters.live_bytes.fetch_sub(layout.size(), Ordering::SeqCst);
    }
}

impl<P> Clone for TrackingAllocator<P>
where
    P: SharedPointerKind,
{
    fn clone(&self) -> TrackingAllocator<P> {
        TrackingAllocator { counters: SharedPointer::clone(&self.counters) }
    }
}

impl<P> Default for TrackingAllocator<P>
where
    P: SharedPointerKind,
{
    fn default() -> TrackingAllocator<P> {
        TrackingAllocator::new_with_ptr_kind()
    }
}

impl<P> fmt::Debug for TrackingAllocator<P>
where
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("allocations", &self.allocations())
            .field("deallocations", &self.deallocations())
            .field("live_bytes", &self.live_bytes())
            .field("failures", &self.failures())
            .finish()
    }
}
