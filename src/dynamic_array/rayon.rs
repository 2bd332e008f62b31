/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Rayon parallel iterator support for `DynamicArray`.
//!
//! Parallel iteration only ever sees the live elements, handed out as a slice.

use super::DynamicArray;
use crate::allocator::RawAllocator;
use ::rayon::iter::IntoParallelIterator;
use ::rayon::slice::{Iter, IterMut};

impl<'a, T, A> IntoParallelIterator for &'a DynamicArray<T, A>
where
    T: Sync + 'a,
    A: RawAllocator,
{
    type Item = &'a T;
    type Iter = Iter<'a, T>;

    fn into_par_iter(self) -> Iter<'a, T> {
        self.as_slice().into_par_iter()
    }
}

impl<'a, T, A> IntoParallelIterator for &'a mut DynamicArray<T, A>
where
    T: Send + 'a,
    A: RawAllocator,
{
    type Item = &'a mut T;
    type Iter = IterMut<'a, T>;

    fn into_par_iter(self) -> IterMut<'a, T> {
        self.as_mut_slice().into_par_iter()
    }
}
