/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use super::*;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use pretty_assertions::assert_eq;
use static_assertions::assert_impl_all;

assert_impl_all!(FixedArray<i32, 3>: Send, Sync, Clone);

#[test]
fn test_new_is_default_filled() {
    let array: FixedArray<i32, 4> = FixedArray::new();

    assert_eq!(array, [0, 0, 0, 0]);
    assert_eq!(array.size(), 4);
    assert_eq!(array.len(), 4);
    assert!(!array.is_empty());
}

#[test]
fn test_macro_fixed_array() {
    let array = fixed_array!["a", "b", "c"];

    assert_eq!(array.size(), 3);
    assert_eq!(array, ["a", "b", "c"]);
}

#[test]
fn test_from_elem_and_fill() {
    let mut array: FixedArray<String, 2> = FixedArray::from_elem(String::from("x"));

    assert_eq!(array, ["x", "x"]);

    array.fill(String::from("y"));

    assert_eq!(array, ["y", "y"]);
}

#[test]
fn test_try_from_iter() {
    let exact: Result<FixedArray<i32, 3>, _> = FixedArray::try_from_iter(1..=3);
    let short: Result<FixedArray<i32, 3>, _> = FixedArray::try_from_iter(vec![1, 2]);
    let long: Result<FixedArray<i32, 3>, _> = FixedArray::try_from_iter(0..4);

    assert_eq!(exact, Ok(fixed_array![1, 2, 3]));
    assert_eq!(short, Err(ArrayError::LengthMismatch { expected: 3, actual: 2 }));
    assert_eq!(long, Err(ArrayError::LengthMismatch { expected: 3, actual: 4 }));
}

#[test]
fn test_try_from_iter_infinite_source() {
    let endless: Result<FixedArray<i32, 3>, _> = FixedArray::try_from_iter(core::iter::repeat(1));

    assert_eq!(endless, Err(ArrayError::LengthMismatch { expected: 3, actual: 4 }));
}

#[test]
fn test_try_from_vec_and_dynamic_array() {
    assert_eq!(FixedArray::<i32, 2>::try_from(vec![1, 2]), Ok(fixed_array![1, 2]));
    assert_eq!(
        FixedArray::<i32, 2>::try_from(vec![1, 2, 3]),
        Err(ArrayError::LengthMismatch { expected: 2, actual: 3 })
    );

    let dynamic = crate::dynamic_array![4, 5];

    assert_eq!(FixedArray::<i32, 2>::try_from(dynamic), Ok(fixed_array![4, 5]));
}

#[test]
fn test_at() {
    let mut array = fixed_array![1, 2, 3];

    assert_eq!(array.at(0), Ok(&1));
    assert_eq!(array.at(3), Err(ArrayError::OutOfRange { index: 3, len: 3 }));

    *array.at_mut(1).unwrap() = 20;

    assert_eq!(array.get(1), Some(&20));
    assert_eq!(array.get(3), None);
}

#[test]
fn test_index() {
    let mut array = fixed_array![1, 2, 3];

    array[0] = 10;

    assert_eq!(array[0], 10);
    assert_eq!(&array[1..], &[2, 3]);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn test_index_out_of_bounds() {
    let array = fixed_array![1, 2, 3];
    let _value: i32 = array[3];
}

#[test]
fn test_front_back() {
    let array = fixed_array![1, 2, 3];

    assert_eq!(array.front(), Some(&1));
    assert_eq!(array.back(), Some(&3));
}

#[test]
fn test_empty() {
    let array: FixedArray<i32, 0> = FixedArray::new();

    assert!(array.is_empty());
    assert_eq!(array.front(), None);
    assert_eq!(array.back(), None);
    assert_eq!(array.data(), None);
    assert_eq!(array.iter().next(), None);
}

#[test]
fn test_iter() {
    let mut array = fixed_array![1, 2, 3];

    for v in array.iter_mut() {
        *v *= 2;
    }

    assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec![2, 4, 6]);
    assert_eq!((&array).into_iter().rev().copied().collect::<Vec<_>>(), vec![6, 4, 2]);
    assert_eq!(array.into_iter().collect::<Vec<_>>(), vec![2, 4, 6]);
}

#[test]
fn test_into_dynamic_array() {
    let array = fixed_array![1, 2, 3].into_dynamic_array();

    assert_eq!(array, [1, 2, 3]);
    assert_eq!(array.capacity(), 3);
}

#[test]
fn test_clone_is_independent() {
    let array = fixed_array![String::from("a"), String::from("b")];
    let mut clone = array.clone();

    clone[0].push('!');

    assert_eq!(array, ["a", "b"]);
    assert_eq!(clone, ["a!", "b"]);
}

#[test]
fn test_display() {
    let empty: FixedArray<i32, 0> = FixedArray::new();

    assert_eq!(format!("{}", empty), "[]");
    assert_eq!(format!("{}", fixed_array![0, 1, 2]), "[0, 1, 2]");
    assert_eq!(format!("{:?}", fixed_array!["a"]), "[\"a\"]");
}

#[test]
fn test_eq() {
    let array_1 = fixed_array![1, 2];
    let array_2 = fixed_array![1, 3];
    let array_3 = fixed_array![1, 2, 3];

    assert_eq!(array_1, fixed_array![1, 2]);
    assert_ne!(array_1, array_2);
    assert!(array_1 != array_3);
}

#[test]
fn test_hash() {
    fn hash<T: Hash>(value: &T) -> u64 {
        #[allow(deprecated)]
        let mut hasher = core::hash::SipHasher::new();

        value.hash(&mut hasher);

        hasher.finish()
    }

    let fixed = fixed_array![1, 2, 3];

    assert_eq!(hash(&fixed), hash(&fixed.clone()));
    assert_eq!(hash(&fixed), hash(&crate::dynamic_array![1, 2, 3]));
    assert_ne!(hash(&fixed), hash(&fixed_array![1, 2, 4]));
}

#[cfg(feature = "serde")]
#[test]
fn test_serde() {
    let array = fixed_array![5, 6, 7];
    let encoded = serde_json::to_string(&array).unwrap();
    let decoded: FixedArray<i32, 3> = serde_json::from_str(&encoded).unwrap();

    assert_eq!(encoded, "[5,6,7]");
    assert_eq!(decoded, array);

    let wrong: Result<FixedArray<i32, 3>, _> = serde_json::from_str("[5,6]");
    let message = wrong.err().map(|err| format!("{}", err)).unwrap_or_default();

    assert!(message.contains("expected a sequence of 3 elements"), "unexpected error: {}", message);
}
