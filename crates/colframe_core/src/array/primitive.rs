use std::cmp::Ordering;
use std::fmt::Debug;

use ahash::RandomState;
use num_traits::ToPrimitive;

use super::{is_valid, normalize_validity};
use crate::bitmap::Bitmap;

/// Fixed-width values that can be stored in a primitive array.
pub trait NativeValue:
    Copy + Default + Debug + PartialEq + PartialOrd + ToPrimitive + Send + Sync + 'static
{
    /// Total ordering. Floats order NaN after everything else and treat
    /// `-0.0` as `0.0`.
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Hash a single value. Floats hash the bit pattern of their canonical
    /// form.
    fn hash_with(&self, state: &RandomState) -> u64;
}

macro_rules! impl_native_integer {
    ($($t:ty),*) => {
        $(
            impl NativeValue for $t {
                #[inline]
                fn total_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                #[inline]
                fn hash_with(&self, state: &RandomState) -> u64 {
                    state.hash_one(self)
                }
            }
        )*
    };
}

/// Fold `-0.0` into `0.0` and every NaN into a single positive NaN, so keys
/// that are equal by value compare and hash the same.
macro_rules! canonical_float {
    ($t:ty, $v:expr) => {{
        let v: $t = $v;
        if v.is_nan() {
            <$t>::NAN.abs()
        } else if v == 0.0 {
            0.0
        } else {
            v
        }
    }};
}

macro_rules! impl_native_float {
    ($($t:ty),*) => {
        $(
            impl NativeValue for $t {
                #[inline]
                fn total_cmp(&self, other: &Self) -> Ordering {
                    canonical_float!($t, *self).total_cmp(&canonical_float!($t, *other))
                }

                #[inline]
                fn hash_with(&self, state: &RandomState) -> u64 {
                    state.hash_one(canonical_float!($t, *self).to_bits())
                }
            }
        )*
    };
}

impl_native_integer!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_native_float!(f32, f64);

/// A null-aware array of fixed-width values.
///
/// Slots that are null hold `T::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArray<T> {
    /// Validity of each value, `None` when every value is valid.
    validity: Option<Bitmap>,
    values: Vec<T>,
}

impl<T: NativeValue> PrimitiveArray<T> {
    pub fn new(values: Vec<T>, validity: Option<Bitmap>) -> Self {
        if let Some(validity) = &validity {
            assert_eq!(values.len(), validity.len(), "validity length mismatch");
        }
        PrimitiveArray {
            validity: validity.and_then(normalize_validity),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn is_valid(&self, idx: usize) -> bool {
        is_valid(self.validity.as_ref(), idx)
    }

    pub fn value(&self, idx: usize) -> Option<T> {
        if self.is_valid(idx) {
            Some(self.values[idx])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<T>> + '_ {
        (0..self.len()).map(|idx| self.value(idx))
    }

    /// Compare two valid values.
    pub(crate) fn cmp_valid(&self, idx: usize, other: &Self, other_idx: usize) -> Ordering {
        self.values[idx].total_cmp(&other.values[other_idx])
    }

    pub(crate) fn hash_valid(&self, idx: usize, state: &RandomState) -> u64 {
        self.values[idx].hash_with(state)
    }

    /// Gather values at the given positions, `None` producing a null.
    ///
    /// Panics if a position is out of bounds.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> Self {
        indices.iter().map(|idx| idx.and_then(|idx| self.value(idx))).collect()
    }

    /// Build an array by picking `(array, row)` pairs from several arrays.
    pub fn interleave(arrays: &[&Self], indices: &[(usize, usize)]) -> Self {
        indices
            .iter()
            .map(|&(arr_idx, row_idx)| arrays[arr_idx].value(row_idx))
            .collect()
    }
}

impl<T: NativeValue> FromIterator<Option<T>> for PrimitiveArray<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();

        let mut validity = Bitmap::with_capacity(lower);
        let mut values = Vec::with_capacity(lower);

        for v in iter {
            match v {
                Some(v) => {
                    values.push(v);
                    validity.push(true);
                }
                None => {
                    values.push(T::default());
                    validity.push(false);
                }
            }
        }

        PrimitiveArray::new(values, Some(validity))
    }
}

impl<T: NativeValue> From<Vec<T>> for PrimitiveArray<T> {
    fn from(values: Vec<T>) -> Self {
        PrimitiveArray {
            validity: None,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_opt_with_nulls() {
        let arr = PrimitiveArray::from_iter([Some(1), None, Some(3)]);
        let got = arr.take_opt(&[Some(2), None, Some(1), Some(0)]);

        assert_eq!(vec![Some(3), None, None, Some(1)], got.iter().collect::<Vec<_>>());
    }

    #[test]
    fn all_valid_drops_bitmap() {
        let arr = PrimitiveArray::from_iter([Some(1.0), Some(2.0)]);
        assert!(arr.validity().is_none());
    }

    #[test]
    fn interleave_two() {
        let a = PrimitiveArray::from(vec![1_i64, 2, 3]);
        let b = PrimitiveArray::from_iter([Some(8_i64), None]);

        let got = PrimitiveArray::interleave(&[&a, &b], &[(0, 0), (1, 1), (1, 0), (0, 2)]);
        assert_eq!(vec![Some(1), None, Some(8), Some(3)], got.iter().collect::<Vec<_>>());
    }

    #[test]
    fn float_total_order() {
        assert_eq!(Ordering::Less, 1.0_f64.total_cmp(&f64::NAN));
        assert_eq!(Ordering::Equal, NativeValue::total_cmp(&f64::NAN, &f64::NAN));
    }

    #[test]
    fn float_keys_compare_by_value() {
        let state = RandomState::with_seeds(0, 0, 0, 0);
        let zero = std::hint::black_box(0.0_f64);

        // (left, right)
        let equal_pairs = [(0.0_f64, -0.0_f64), (f64::NAN, -f64::NAN), (f64::NAN, zero / zero)];
        for (left, right) in equal_pairs {
            assert_eq!(Ordering::Equal, NativeValue::total_cmp(&left, &right), "{left} {right}");
            assert_eq!(left.hash_with(&state), right.hash_with(&state), "{left} {right}");
        }

        assert_eq!(Ordering::Greater, NativeValue::total_cmp(&-f64::NAN, &f64::INFINITY));
        assert_eq!(Ordering::Equal, NativeValue::total_cmp(&-0.0_f32, &0.0_f32));
    }
}
