/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

#![cfg_attr(feature = "fatal-warnings", deny(warnings))]

//! Baseline for the `dynamic_array` benchmarks.

#[macro_use]
extern crate bencher;

mod utils;

use bencher::{black_box, Bencher};
use utils::iterations;
use utils::BencherNoDrop;

fn filled(limit: usize) -> Vec<usize> {
    (0..limit).collect()
}

fn std_vec_push(bench: &mut Bencher) {
    let limit = iterations(100_000);

    bench.iter_no_drop(|| {
        let mut vector: Vec<usize> = Vec::new();

        for i in 0..limit {
            vector.push(i);
        }

        vector
    });
}

fn std_vec_pop(bench: &mut Bencher) {
    let limit = iterations(100_000);
    let full = filled(limit);

    bench.iter_no_drop(|| {
        let mut vector = full.clone();

        while let Some(v) = vector.pop() {
            black_box(v);
        }

        vector
    });
}

fn std_vec_get(bench: &mut Bencher) {
    let limit = iterations(100_000);
    let vector = filled(limit);

    bench.iter(|| {
        for i in 0..limit {
            black_box(vector.get(i));
        }
    });
}

fn std_vec_insert_front(bench: &mut Bencher) {
    let limit = iterations(1_000);

    bench.iter_no_drop(|| {
        let mut vector: Vec<usize> = Vec::new();

        for i in 0..limit {
            vector.insert(0, i);
        }

        vector
    });
}

fn std_vec_iterate(bench: &mut Bencher) {
    let limit = iterations(100_000);
    let vector = filled(limit);

    bench.iter(|| {
        for i in &vector {
            black_box(i);
        }
    });
}

benchmark_group!(benches, std_vec_push, std_vec_pop, std_vec_get, std_vec_insert_front, std_vec_iterate);
benchmark_main!(benches);
