/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// The allocator could not satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// Errors reported by the fallible operations of the containers in this crate.
///
/// No operation retries or swallows an error: every failure is returned to the immediate
/// caller, and the container it was called on is left in a consistent state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ArrayError {
    /// Checked element access past the end of the live elements.
    #[error("index {index} is out of range for an array of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A structural mutation was given a position outside of the array.
    #[error("position {position} is not valid for an array of length {len}")]
    InvalidPosition { position: usize, len: usize },

    /// A range of positions that is reversed or extends past the end of the array.
    #[error("range {start}..{end} is not valid for an array of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// An exact-size construction got a source with a different number of elements.
    ///
    /// A source that is too long is not read to its end: `actual` is then `expected + 1`.
    #[error("expected exactly {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator refused a request of the given layout.
    #[error("allocation of {size} bytes with alignment {align} failed")]
    AllocFailed { size: usize, align: usize },
}
