/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

#![no_std]
#![cfg_attr(feature = "fatal-warnings", deny(warnings))]
#![warn(unsafe_op_in_unsafe_fn)]

// Note: Keep this in sync with `README.md`.  Note that the doc links must be removed.
//! # Dynamic arrays with explicit lifecycle management
//!
//! This crate provides a contiguous growable array with amortized constant-time appends,
//! explicit capacity control and an injectable allocator, together with its fixed-size peer.
//!
//! # Data Structures
//!
//! This crate implements the following data structures:
//!
//!   1. [`DynamicArray`](#dynamicarray)
//!   2. [`FixedArray`](#fixedarray)
//!
//! ## `DynamicArray`
//!
//! A heap buffer of `capacity()` slots of which the first `len()` hold live elements.  The
//! capacity doubles when a single element does not fit, bulk insertions grow it exactly, and it
//! only shrinks on request.
//!
//! ### Example
//!
//! ```rust
//! use dynarray::{dynamic_array, ArrayError, DynamicArray};
//!
//! let mut array = DynamicArray::new();
//!
//! array.reserve(5);
//! assert_eq!(array.capacity(), 5);
//!
//! array.push_back("I'm");
//! array.push_back("an");
//! array.push_back("array");
//!
//! assert_eq!(array[1], "an");
//! assert_eq!(array.at(3), Err(ArrayError::OutOfRange { index: 3, len: 3 }));
//!
//! let mut numbers = dynamic_array![1, 2, 3, 4, 5];
//!
//! numbers.insert(0, 99).unwrap();
//! assert_eq!(numbers, [99, 1, 2, 3, 4, 5]);
//!
//! numbers.erase(0).unwrap();
//! assert_eq!(numbers, [1, 2, 3, 4, 5]);
//! ```
//!
//! ## `FixedArray`
//!
//! An array whose size is part of its type.  Building one from a source of the wrong length
//! fails instead of truncating.
//!
//! ### Example
//!
//! ```rust
//! use dynarray::{fixed_array, ArrayError, FixedArray};
//!
//! let array = fixed_array![1, 2, 3];
//!
//! assert_eq!(array.size(), 3);
//! assert_eq!(array.back(), Some(&3));
//!
//! let short: Result<FixedArray<i32, 3>, _> = FixedArray::try_from_iter([1, 2]);
//!
//! assert_eq!(short, Err(ArrayError::LengthMismatch { expected: 3, actual: 2 }));
//! ```
//!
//! # Allocators
//!
//! Every container stores a [`RawAllocator`] and uses it for all of its memory.  [`Global`] is
//! the default.  [`TrackingAllocator`] records every request and can be told to fail, which is
//! how the failure paths of the containers are tested.

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

pub mod allocator;
pub mod dynamic_array;
pub mod error;
pub mod fixed_array;

pub use allocator::{Global, RawAllocator, TrackingAllocator, TrackingAllocatorSync};
pub use dynamic_array::DynamicArray;
pub use error::{AllocError, ArrayError};
pub use fixed_array::FixedArray;
