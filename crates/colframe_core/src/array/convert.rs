//! Conversions from Rust collections into arrays, inferring the data type from
//! the element type.

use chrono::{NaiveDate, NaiveDateTime};

use super::{Array, BooleanArray, ListArray, PrimitiveArray, Utf8Array};
use crate::bitmap::Bitmap;
use crate::scalar::{naive_to_date32, naive_to_date64};

mod sealed {
    pub trait Sealed {}
}

/// Rust values that map onto exactly one data type.
///
/// Implemented for the fixed-width numerics, `bool`, strings, chrono dates,
/// and `Vec<T>` of any element (a list).
pub trait ArrayElement: sealed::Sealed + Sized {
    fn collect_valid(values: Vec<Self>) -> Array;

    fn collect_optional(values: Vec<Option<Self>>) -> Array;
}

macro_rules! impl_primitive_element {
    ($native:ty, $variant:ident) => {
        impl sealed::Sealed for $native {}

        impl ArrayElement for $native {
            fn collect_valid(values: Vec<Self>) -> Array {
                Array::$variant(PrimitiveArray::from(values))
            }

            fn collect_optional(values: Vec<Option<Self>>) -> Array {
                Array::$variant(PrimitiveArray::from_iter(values))
            }
        }
    };
}

impl_primitive_element!(i8, Int8);
impl_primitive_element!(i16, Int16);
impl_primitive_element!(i32, Int32);
impl_primitive_element!(i64, Int64);
impl_primitive_element!(u8, UInt8);
impl_primitive_element!(u16, UInt16);
impl_primitive_element!(u32, UInt32);
impl_primitive_element!(u64, UInt64);
impl_primitive_element!(f32, Float32);
impl_primitive_element!(f64, Float64);

impl sealed::Sealed for bool {}

impl ArrayElement for bool {
    fn collect_valid(values: Vec<Self>) -> Array {
        Array::Bool(BooleanArray::from_iter(values))
    }

    fn collect_optional(values: Vec<Option<Self>>) -> Array {
        Array::Bool(BooleanArray::from_iter(values))
    }
}

impl sealed::Sealed for &str {}

impl ArrayElement for &str {
    fn collect_valid(values: Vec<Self>) -> Array {
        Array::Utf8(values.into_iter().map(Some).collect())
    }

    fn collect_optional(values: Vec<Option<Self>>) -> Array {
        Array::Utf8(Utf8Array::from_iter(values))
    }
}

impl sealed::Sealed for String {}

impl ArrayElement for String {
    fn collect_valid(values: Vec<Self>) -> Array {
        Array::Utf8(values.into_iter().map(Some).collect())
    }

    fn collect_optional(values: Vec<Option<Self>>) -> Array {
        Array::Utf8(Utf8Array::from_iter(values))
    }
}

impl sealed::Sealed for NaiveDate {}

impl ArrayElement for NaiveDate {
    fn collect_valid(values: Vec<Self>) -> Array {
        Array::Date32(PrimitiveArray::from(
            values.into_iter().map(naive_to_date32).collect::<Vec<_>>(),
        ))
    }

    fn collect_optional(values: Vec<Option<Self>>) -> Array {
        Array::Date32(values.into_iter().map(|v| v.map(naive_to_date32)).collect())
    }
}

impl sealed::Sealed for NaiveDateTime {}

impl ArrayElement for NaiveDateTime {
    fn collect_valid(values: Vec<Self>) -> Array {
        Array::Date64(PrimitiveArray::from(
            values.into_iter().map(naive_to_date64).collect::<Vec<_>>(),
        ))
    }

    fn collect_optional(values: Vec<Option<Self>>) -> Array {
        Array::Date64(values.into_iter().map(|v| v.map(naive_to_date64)).collect())
    }
}

impl<T: ArrayElement> sealed::Sealed for Vec<T> {}

/// Nested vectors become lists, the child type inferred from `T`.
impl<T: ArrayElement> ArrayElement for Vec<T> {
    fn collect_valid(values: Vec<Self>) -> Array {
        Self::collect_optional(values.into_iter().map(Some).collect())
    }

    fn collect_optional(values: Vec<Option<Self>>) -> Array {
        let mut offsets = Vec::with_capacity(values.len() + 1);
        offsets.push(0_i64);
        let mut validity = Bitmap::with_capacity(values.len());
        let mut flat: Vec<T> = Vec::new();

        for v in values {
            validity.push(v.is_some());
            if let Some(v) = v {
                flat.extend(v);
            }
            offsets.push(flat.len() as i64);
        }

        let child = T::collect_valid(flat);
        Array::LargeList(ListArray::new(child, offsets, Some(validity)))
    }
}

impl<T: ArrayElement> From<Vec<T>> for Array {
    fn from(values: Vec<T>) -> Self {
        T::collect_valid(values)
    }
}

impl<T: ArrayElement> From<Vec<Option<T>>> for Array {
    fn from(values: Vec<Option<T>>) -> Self {
        T::collect_optional(values)
    }
}

impl<T: ArrayElement, const N: usize> From<[T; N]> for Array {
    fn from(values: [T; N]) -> Self {
        T::collect_valid(Vec::from(values))
    }
}

impl<T: ArrayElement, const N: usize> From<[Option<T>; N]> for Array {
    fn from(values: [Option<T>; N]) -> Self {
        T::collect_optional(Vec::from(values))
    }
}

impl<T: ArrayElement + Clone> From<&[T]> for Array {
    fn from(values: &[T]) -> Self {
        T::collect_valid(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataType;
    use crate::scalar::ScalarValue;

    #[test]
    fn infer_types() {
        struct TestCase {
            array: Array,
            datatype: DataType,
        }

        let cases = [
            TestCase {
                array: Array::from(vec![1_i8, 2]),
                datatype: DataType::Int8,
            },
            TestCase {
                array: Array::from(vec![Some(1_u32), None]),
                datatype: DataType::UInt32,
            },
            TestCase {
                array: Array::from(vec![1.0_f32]),
                datatype: DataType::Float32,
            },
            TestCase {
                array: Array::from([true, false]),
                datatype: DataType::Bool,
            },
            TestCase {
                array: Array::from(vec!["a".to_string()]),
                datatype: DataType::Utf8,
            },
            TestCase {
                array: Array::from(vec![NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()]),
                datatype: DataType::Date32,
            },
            TestCase {
                array: Array::from(vec![vec![vec![1_u8]]]),
                datatype: DataType::list(DataType::list(DataType::UInt8)),
            },
        ];

        for case in cases {
            assert_eq!(case.datatype, case.array.datatype());
        }
    }

    #[test]
    fn optional_lists() {
        let arr = Array::from(vec![Some(vec![1_i64, 2]), None, Some(vec![])]);
        assert_eq!(3, arr.len());
        assert_eq!(1, arr.null_count());
        assert_eq!(ScalarValue::Null, arr.scalar_at(1));
    }

    #[test]
    fn date_epoch() {
        let arr = Array::from(vec![NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()]);
        assert_eq!(ScalarValue::Date32(1), arr.scalar_at(0));
    }
}
