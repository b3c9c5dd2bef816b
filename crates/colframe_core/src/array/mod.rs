//! Typed, null-aware column storage.

mod boolean;
mod convert;
mod list;
mod primitive;
mod varlen;

use std::cmp::Ordering;

use ahash::RandomState;
pub use boolean::*;
pub use convert::ArrayElement;
use colframe_error::{FrameError, Result};
use num_traits::ToPrimitive;
pub use list::*;
pub use primitive::*;
pub use varlen::*;

use crate::bitmap::Bitmap;
use crate::compute::hash::null_hash_value;
use crate::datatype::DataType;
use crate::scalar::{ListScalar, ScalarValue};

/// Check the validity of a slot, a missing bitmap meaning all valid.
#[inline]
pub(crate) fn is_valid(validity: Option<&Bitmap>, idx: usize) -> bool {
    validity.map(|v| v.value(idx)).unwrap_or(true)
}

/// Drop bitmaps that mark everything as valid.
pub(crate) fn normalize_validity(validity: Bitmap) -> Option<Bitmap> {
    if validity.is_all_true() {
        None
    } else {
        Some(validity)
    }
}

/// Column storage, one variant per data type.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Int8(PrimitiveArray<i8>),
    Int16(PrimitiveArray<i16>),
    Int32(PrimitiveArray<i32>),
    Int64(PrimitiveArray<i64>),
    UInt8(PrimitiveArray<u8>),
    UInt16(PrimitiveArray<u16>),
    UInt32(PrimitiveArray<u32>),
    UInt64(PrimitiveArray<u64>),
    Float32(PrimitiveArray<f32>),
    Float64(PrimitiveArray<f64>),
    Bool(BooleanArray),
    Utf8(Utf8Array),
    LargeList(ListArray),
    Date32(PrimitiveArray<i32>),
    Date64(PrimitiveArray<i64>),
}

/// Evaluate an expression against the inner typed array.
macro_rules! with_array {
    ($arr:expr, $inner:ident => $body:expr) => {
        match $arr {
            Array::Int8($inner) => $body,
            Array::Int16($inner) => $body,
            Array::Int32($inner) => $body,
            Array::Int64($inner) => $body,
            Array::UInt8($inner) => $body,
            Array::UInt16($inner) => $body,
            Array::UInt32($inner) => $body,
            Array::UInt64($inner) => $body,
            Array::Float32($inner) => $body,
            Array::Float64($inner) => $body,
            Array::Bool($inner) => $body,
            Array::Utf8($inner) => $body,
            Array::LargeList($inner) => $body,
            Array::Date32($inner) => $body,
            Array::Date64($inner) => $body,
        }
    };
}

/// Map the inner typed array to a new array of the same variant.
macro_rules! map_array {
    ($arr:expr, $inner:ident => $body:expr) => {
        match $arr {
            Array::Int8($inner) => Array::Int8($body),
            Array::Int16($inner) => Array::Int16($body),
            Array::Int32($inner) => Array::Int32($body),
            Array::Int64($inner) => Array::Int64($body),
            Array::UInt8($inner) => Array::UInt8($body),
            Array::UInt16($inner) => Array::UInt16($body),
            Array::UInt32($inner) => Array::UInt32($body),
            Array::UInt64($inner) => Array::UInt64($body),
            Array::Float32($inner) => Array::Float32($body),
            Array::Float64($inner) => Array::Float64($body),
            Array::Bool($inner) => Array::Bool($body),
            Array::Utf8($inner) => Array::Utf8($body),
            Array::LargeList($inner) => Array::LargeList($body),
            Array::Date32($inner) => Array::Date32($body),
            Array::Date64($inner) => Array::Date64($body),
        }
    };
}

/// Evaluate an expression against two arrays of the same variant, falling
/// back to `$default` when the variants differ.
macro_rules! with_array_pair {
    ($left:expr, $right:expr, $a:ident, $b:ident => $body:expr, _ => $default:expr) => {
        match ($left, $right) {
            (Array::Int8($a), Array::Int8($b)) => $body,
            (Array::Int16($a), Array::Int16($b)) => $body,
            (Array::Int32($a), Array::Int32($b)) => $body,
            (Array::Int64($a), Array::Int64($b)) => $body,
            (Array::UInt8($a), Array::UInt8($b)) => $body,
            (Array::UInt16($a), Array::UInt16($b)) => $body,
            (Array::UInt32($a), Array::UInt32($b)) => $body,
            (Array::UInt64($a), Array::UInt64($b)) => $body,
            (Array::Float32($a), Array::Float32($b)) => $body,
            (Array::Float64($a), Array::Float64($b)) => $body,
            (Array::Bool($a), Array::Bool($b)) => $body,
            (Array::Utf8($a), Array::Utf8($b)) => $body,
            (Array::LargeList($a), Array::LargeList($b)) => $body,
            (Array::Date32($a), Array::Date32($b)) => $body,
            (Array::Date64($a), Array::Date64($b)) => $body,
            _ => $default,
        }
    };
}

/// Collect references to the inner arrays of a single variant.
macro_rules! collect_variant {
    ($arrays:expr, $variant:ident) => {
        $arrays
            .iter()
            .filter_map(|arr| match arr {
                Array::$variant(arr) => Some(arr),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
}

macro_rules! numeric_value {
    ($arr:expr, $idx:expr, $conv:ident) => {
        match $arr {
            Array::Int8(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::Int16(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::Int32(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::Int64(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::UInt8(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::UInt16(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::UInt32(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::UInt64(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::Float32(arr) => arr.value($idx).and_then(|v| v.$conv()),
            Array::Float64(arr) => arr.value($idx).and_then(|v| v.$conv()),
            _ => None,
        }
    };
}

/// Build a primitive array from scalars, casting each to the target type.
fn collect_primitive<T: NativeValue>(
    datatype: &DataType,
    values: impl IntoIterator<Item = ScalarValue>,
    extract: impl Fn(ScalarValue) -> Option<T>,
) -> Result<PrimitiveArray<T>> {
    values
        .into_iter()
        .map(|v| {
            if v.is_null() {
                return Ok(None);
            }
            let got = v.datatype();
            let v = v.try_cast(datatype)?;
            match extract(v) {
                Some(v) => Ok(Some(v)),
                None => Err(FrameError::type_mismatch(
                    "array from scalars",
                    datatype,
                    got.map(|d| d.to_string()).unwrap_or_default(),
                )),
            }
        })
        .collect()
}

impl Array {
    pub fn datatype(&self) -> DataType {
        match self {
            Array::Int8(_) => DataType::Int8,
            Array::Int16(_) => DataType::Int16,
            Array::Int32(_) => DataType::Int32,
            Array::Int64(_) => DataType::Int64,
            Array::UInt8(_) => DataType::UInt8,
            Array::UInt16(_) => DataType::UInt16,
            Array::UInt32(_) => DataType::UInt32,
            Array::UInt64(_) => DataType::UInt64,
            Array::Float32(_) => DataType::Float32,
            Array::Float64(_) => DataType::Float64,
            Array::Bool(_) => DataType::Bool,
            Array::Utf8(_) => DataType::Utf8,
            Array::LargeList(arr) => DataType::list(arr.child_datatype()),
            Array::Date32(_) => DataType::Date32,
            Array::Date64(_) => DataType::Date64,
        }
    }

    pub fn len(&self) -> usize {
        with_array!(self, arr => arr.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        with_array!(self, arr => arr.validity())
    }

    pub fn is_valid(&self, idx: usize) -> bool {
        with_array!(self, arr => arr.is_valid(idx))
    }

    pub fn null_count(&self) -> usize {
        match self.validity() {
            Some(validity) => validity.len() - validity.count_trues(),
            None => 0,
        }
    }

    /// Create an array of the given type where every value is null.
    pub fn new_nulls(datatype: &DataType, len: usize) -> Self {
        let validity = Some(Bitmap::new_with_all_false(len));
        match datatype {
            DataType::Int8 => Array::Int8(PrimitiveArray::new(vec![0; len], validity)),
            DataType::Int16 => Array::Int16(PrimitiveArray::new(vec![0; len], validity)),
            DataType::Int32 => Array::Int32(PrimitiveArray::new(vec![0; len], validity)),
            DataType::Int64 => Array::Int64(PrimitiveArray::new(vec![0; len], validity)),
            DataType::UInt8 => Array::UInt8(PrimitiveArray::new(vec![0; len], validity)),
            DataType::UInt16 => Array::UInt16(PrimitiveArray::new(vec![0; len], validity)),
            DataType::UInt32 => Array::UInt32(PrimitiveArray::new(vec![0; len], validity)),
            DataType::UInt64 => Array::UInt64(PrimitiveArray::new(vec![0; len], validity)),
            DataType::Float32 => Array::Float32(PrimitiveArray::new(vec![0.0; len], validity)),
            DataType::Float64 => Array::Float64(PrimitiveArray::new(vec![0.0; len], validity)),
            DataType::Bool => Array::Bool(BooleanArray::new(
                Bitmap::new_with_all_false(len),
                validity,
            )),
            DataType::Utf8 => Array::Utf8(Utf8Array::from_iter(
                std::iter::repeat_n(None::<&str>, len),
            )),
            DataType::LargeList(meta) => Array::LargeList(ListArray::new(
                Array::new_nulls(&meta.datatype, 0),
                vec![0; len + 1],
                validity,
            )),
            DataType::Date32 => Array::Date32(PrimitiveArray::new(vec![0; len], validity)),
            DataType::Date64 => Array::Date64(PrimitiveArray::new(vec![0; len], validity)),
        }
    }

    /// Build an array of the given type from scalar values.
    ///
    /// Numeric scalars are cast to the target type, nulls produce null slots.
    pub fn try_from_scalars(
        datatype: &DataType,
        values: impl IntoIterator<Item = ScalarValue>,
    ) -> Result<Self> {
        Ok(match datatype {
            DataType::Int8 => Array::Int8(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Int8(v) => Some(v),
                _ => None,
            })?),
            DataType::Int16 => Array::Int16(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Int16(v) => Some(v),
                _ => None,
            })?),
            DataType::Int32 => Array::Int32(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Int32(v) => Some(v),
                _ => None,
            })?),
            DataType::Int64 => Array::Int64(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Int64(v) => Some(v),
                _ => None,
            })?),
            DataType::UInt8 => Array::UInt8(collect_primitive(datatype, values, |v| match v {
                ScalarValue::UInt8(v) => Some(v),
                _ => None,
            })?),
            DataType::UInt16 => Array::UInt16(collect_primitive(datatype, values, |v| match v {
                ScalarValue::UInt16(v) => Some(v),
                _ => None,
            })?),
            DataType::UInt32 => Array::UInt32(collect_primitive(datatype, values, |v| match v {
                ScalarValue::UInt32(v) => Some(v),
                _ => None,
            })?),
            DataType::UInt64 => Array::UInt64(collect_primitive(datatype, values, |v| match v {
                ScalarValue::UInt64(v) => Some(v),
                _ => None,
            })?),
            DataType::Float32 => Array::Float32(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Float32(v) => Some(v),
                _ => None,
            })?),
            DataType::Float64 => Array::Float64(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Float64(v) => Some(v),
                _ => None,
            })?),
            DataType::Date32 => Array::Date32(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Date32(v) => Some(v),
                _ => None,
            })?),
            DataType::Date64 => Array::Date64(collect_primitive(datatype, values, |v| match v {
                ScalarValue::Date64(v) => Some(v),
                _ => None,
            })?),
            DataType::Bool => Array::Bool(
                values
                    .into_iter()
                    .map(|v| match v {
                        ScalarValue::Null => Ok(None),
                        ScalarValue::Bool(v) => Ok(Some(v)),
                        other => Err(scalar_mismatch(datatype, &other)),
                    })
                    .collect::<Result<BooleanArray>>()?,
            ),
            DataType::Utf8 => Array::Utf8(
                values
                    .into_iter()
                    .map(|v| match v {
                        ScalarValue::Null => Ok(None),
                        ScalarValue::Utf8(v) => Ok(Some(v)),
                        other => Err(scalar_mismatch(datatype, &other)),
                    })
                    .collect::<Result<Utf8Array>>()?,
            ),
            DataType::LargeList(meta) => {
                let mut offsets = vec![0_i64];
                let mut validity = Bitmap::default();
                let mut children = Vec::new();

                for v in values {
                    match v {
                        ScalarValue::Null => validity.push(false),
                        ScalarValue::LargeList(list) => {
                            children.extend(list.values);
                            validity.push(true);
                        }
                        other => return Err(scalar_mismatch(datatype, &other)),
                    }
                    offsets.push(children.len() as i64);
                }

                let child = Array::try_from_scalars(&meta.datatype, children)?;
                Array::LargeList(ListArray::new(child, offsets, Some(validity)))
            }
        })
    }

    /// Get the value at `idx` as an owned scalar.
    ///
    /// Panics if `idx` is out of bounds.
    pub fn scalar_at(&self, idx: usize) -> ScalarValue {
        if !self.is_valid(idx) {
            return ScalarValue::Null;
        }

        let opt = match self {
            Array::Int8(arr) => arr.value(idx).map(ScalarValue::Int8),
            Array::Int16(arr) => arr.value(idx).map(ScalarValue::Int16),
            Array::Int32(arr) => arr.value(idx).map(ScalarValue::Int32),
            Array::Int64(arr) => arr.value(idx).map(ScalarValue::Int64),
            Array::UInt8(arr) => arr.value(idx).map(ScalarValue::UInt8),
            Array::UInt16(arr) => arr.value(idx).map(ScalarValue::UInt16),
            Array::UInt32(arr) => arr.value(idx).map(ScalarValue::UInt32),
            Array::UInt64(arr) => arr.value(idx).map(ScalarValue::UInt64),
            Array::Float32(arr) => arr.value(idx).map(ScalarValue::Float32),
            Array::Float64(arr) => arr.value(idx).map(ScalarValue::Float64),
            Array::Bool(arr) => arr.value(idx).map(ScalarValue::Bool),
            Array::Utf8(arr) => arr.value(idx).map(|v| ScalarValue::Utf8(v.to_string())),
            Array::LargeList(arr) => {
                let child = arr.child();
                let values = arr
                    .value_range(idx)
                    .map(|row| child.scalar_at(row))
                    .collect();
                Some(ScalarValue::LargeList(ListScalar {
                    datatype: child.datatype(),
                    values,
                }))
            }
            Array::Date32(arr) => arr.value(idx).map(ScalarValue::Date32),
            Array::Date64(arr) => arr.value(idx).map(ScalarValue::Date64),
        };

        opt.unwrap_or(ScalarValue::Null)
    }

    /// Numeric value at `idx` as an f64.
    ///
    /// `None` for nulls and non-numeric arrays.
    pub fn f64_value(&self, idx: usize) -> Option<f64> {
        numeric_value!(self, idx, to_f64)
    }

    /// Integer value at `idx` widened to i128.
    ///
    /// `None` for nulls and arrays that don't hold integers.
    pub fn i128_value(&self, idx: usize) -> Option<i128> {
        if matches!(self, Array::Float32(_) | Array::Float64(_)) {
            return None;
        }
        numeric_value!(self, idx, to_i128)
    }

    /// Gather rows by position, `None` producing a null row.
    ///
    /// Panics if a position is out of bounds.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> Array {
        map_array!(self, arr => arr.take_opt(indices))
    }

    /// Gather rows by position.
    ///
    /// Panics if a position is out of bounds.
    pub fn take(&self, indices: &[usize]) -> Array {
        let indices: Vec<_> = indices.iter().copied().map(Some).collect();
        self.take_opt(&indices)
    }

    /// Build a new array by picking `(array, row)` pairs from several arrays.
    ///
    /// Errors if no arrays are provided, or if not all arrays are of the same
    /// type.
    pub fn interleave(arrays: &[&Array], indices: &[(usize, usize)]) -> Result<Array> {
        let datatype = match arrays.first() {
            Some(arr) => arr.datatype(),
            None => {
                return Err(FrameError::InvalidArgument(
                    "Cannot interleave zero arrays".to_string(),
                ));
            }
        };
        for arr in arrays {
            let got = arr.datatype();
            if got != datatype {
                return Err(FrameError::type_mismatch("interleave", &datatype, got));
            }
        }

        macro_rules! interleave_variant {
            ($variant:ident, $arr_type:ident) => {
                Array::$variant($arr_type::interleave(
                    &collect_variant!(arrays, $variant),
                    indices,
                ))
            };
        }

        Ok(match arrays[0] {
            Array::Int8(_) => interleave_variant!(Int8, PrimitiveArray),
            Array::Int16(_) => interleave_variant!(Int16, PrimitiveArray),
            Array::Int32(_) => interleave_variant!(Int32, PrimitiveArray),
            Array::Int64(_) => interleave_variant!(Int64, PrimitiveArray),
            Array::UInt8(_) => interleave_variant!(UInt8, PrimitiveArray),
            Array::UInt16(_) => interleave_variant!(UInt16, PrimitiveArray),
            Array::UInt32(_) => interleave_variant!(UInt32, PrimitiveArray),
            Array::UInt64(_) => interleave_variant!(UInt64, PrimitiveArray),
            Array::Float32(_) => interleave_variant!(Float32, PrimitiveArray),
            Array::Float64(_) => interleave_variant!(Float64, PrimitiveArray),
            Array::Bool(_) => interleave_variant!(Bool, BooleanArray),
            Array::Utf8(_) => interleave_variant!(Utf8, Utf8Array),
            Array::LargeList(_) => Array::LargeList(ListArray::interleave(
                &collect_variant!(arrays, LargeList),
                indices,
            )?),
            Array::Date32(_) => interleave_variant!(Date32, PrimitiveArray),
            Array::Date64(_) => interleave_variant!(Date64, PrimitiveArray),
        })
    }

    /// Compare two rows under a total order where nulls sort after all
    /// values.
    ///
    /// Arrays of different types order by type id.
    pub fn cmp_rows(&self, idx: usize, other: &Array, other_idx: usize) -> Ordering {
        match (self.is_valid(idx), other.is_valid(other_idx)) {
            (true, true) => with_array_pair!(self, other, a, b => a.cmp_valid(idx, b, other_idx), _ => {
                self.datatype().datatype_id().cmp(&other.datatype().datatype_id())
            }),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }

    /// Check if two rows hold the same value, treating null as equal to null.
    ///
    /// Floats compare by total order, so NaN equals NaN.
    pub fn rows_eq(&self, idx: usize, other: &Array, other_idx: usize) -> bool {
        self.cmp_rows(idx, other, other_idx) == Ordering::Equal
    }

    /// Hash a single row. Nulls all hash to the same value.
    pub fn hash_row(&self, idx: usize, state: &RandomState) -> u64 {
        if !self.is_valid(idx) {
            return null_hash_value();
        }
        with_array!(self, arr => arr.hash_valid(idx, state))
    }
}

fn scalar_mismatch(datatype: &DataType, got: &ScalarValue) -> FrameError {
    FrameError::type_mismatch(
        "array from scalars",
        datatype,
        got.datatype()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Null".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scalars_casts_numeric() {
        let arr = Array::try_from_scalars(
            &DataType::Float64,
            [ScalarValue::Int64(1), ScalarValue::Null, ScalarValue::Float32(2.5)],
        )
        .unwrap();

        assert_eq!(DataType::Float64, arr.datatype());
        assert_eq!(1, arr.null_count());
        assert_eq!(ScalarValue::Float64(2.5), arr.scalar_at(2));
    }

    #[test]
    fn from_scalars_rejects_mismatch() {
        let err = Array::try_from_scalars(&DataType::Utf8, [ScalarValue::Int8(1)]).unwrap_err();
        assert_eq!(colframe_error::ErrorKind::Type, err.kind());
    }

    #[test]
    fn new_nulls_all_types() {
        let types = [
            DataType::Int8,
            DataType::UInt64,
            DataType::Float32,
            DataType::Bool,
            DataType::Utf8,
            DataType::list(DataType::Utf8),
            DataType::Date64,
        ];

        for datatype in types {
            let arr = Array::new_nulls(&datatype, 3);
            assert_eq!(datatype, arr.datatype());
            assert_eq!(3, arr.len());
            assert_eq!(3, arr.null_count());
        }
    }

    #[test]
    fn cmp_rows_nulls_last() {
        let arr = Array::from(vec![Some(2_i64), None, Some(1)]);

        assert_eq!(Ordering::Greater, arr.cmp_rows(0, &arr, 2));
        assert_eq!(Ordering::Less, arr.cmp_rows(0, &arr, 1));
        assert_eq!(Ordering::Greater, arr.cmp_rows(1, &arr, 2));
        assert!(arr.rows_eq(1, &arr, 1));
    }

    #[test]
    fn interleave_type_mismatch() {
        let a = Array::from(vec![1_i32]);
        let b = Array::from(vec![1_i64]);

        let err = Array::interleave(&[&a, &b], &[(0, 0), (1, 0)]).unwrap_err();
        assert_eq!(colframe_error::ErrorKind::Type, err.kind());
    }

    #[test]
    fn list_scalar_round_trip() {
        let arr = Array::from(vec![vec!["a", "b"], vec![]]);
        let scalars: Vec<_> = (0..arr.len()).map(|idx| arr.scalar_at(idx)).collect();

        let rebuilt = Array::try_from_scalars(&arr.datatype(), scalars).unwrap();
        assert_eq!(arr, rebuilt);
    }

    #[test]
    fn hash_rows_equal_for_equal_values() {
        let state = RandomState::with_seeds(0, 0, 0, 0);
        let arr = Array::from(vec![Some("a"), Some("b"), Some("a"), None]);

        assert_eq!(arr.hash_row(0, &state), arr.hash_row(2, &state));
        assert_ne!(arr.hash_row(0, &state), arr.hash_row(1, &state));
        assert_eq!(null_hash_value(), arr.hash_row(3, &state));
    }
}
