/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use bencher::Bencher;

/// Room for the values produced by `iter_no_drop()`.  Must exceed the number of iterations
/// bencher runs.
const DROP_QUEUE_CAPACITY: usize = 1_000_000;

pub trait BencherNoDrop {
    /// Runs the given benchmark function and keeps what it returns until the measurement is over,
    /// so that freeing the produced array is not part of the measured time.
    fn iter_no_drop<T, F>(&mut self, inner: F)
    where
        F: FnMut() -> T;
}

impl BencherNoDrop for Bencher {
    fn iter_no_drop<T, F>(&mut self, mut inner: F)
    where
        F: FnMut() -> T,
    {
        let mut produced = Vec::with_capacity(DROP_QUEUE_CAPACITY);
        let capacity = produced.capacity();

        self.iter(|| produced.push(inner()));

        assert_eq!(
            capacity,
            produced.capacity(),
            "The queue of produced values grew during the measurement."
        );
    }
}

/// Number of elements a benchmark works on.  Set `CI=true` to run every benchmark on two
/// elements only.
pub fn iterations(n: usize) -> usize {
    match ::std::env::var("CI") {
        Ok(ref v) if v == "true" => 2,
        _ => n,
    }
}
