use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use colframe_error::{FrameError, Result};

use crate::datatype::DataType;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A list value along with the type of its elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ListScalar {
    pub datatype: DataType,
    pub values: Vec<ScalarValue>,
}

/// A single owned value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Untyped null, castable to any type.
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Utf8(String),
    LargeList(ListScalar),
    /// Days since epoch.
    Date32(i32),
    /// Milliseconds since epoch.
    Date64(i64),
}

impl ScalarValue {
    /// Get the data type of this value. Untyped nulls have none.
    pub fn datatype(&self) -> Option<DataType> {
        Some(match self {
            ScalarValue::Null => return None,
            ScalarValue::Int8(_) => DataType::Int8,
            ScalarValue::Int16(_) => DataType::Int16,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::UInt8(_) => DataType::UInt8,
            ScalarValue::UInt16(_) => DataType::UInt16,
            ScalarValue::UInt32(_) => DataType::UInt32,
            ScalarValue::UInt64(_) => DataType::UInt64,
            ScalarValue::Float32(_) => DataType::Float32,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Bool(_) => DataType::Bool,
            ScalarValue::Utf8(_) => DataType::Utf8,
            ScalarValue::LargeList(list) => DataType::list(list.datatype.clone()),
            ScalarValue::Date32(_) => DataType::Date32,
            ScalarValue::Date64(_) => DataType::Date64,
        })
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Numeric value widened to i128, if this is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match self {
            ScalarValue::Int8(v) => *v as i128,
            ScalarValue::Int16(v) => *v as i128,
            ScalarValue::Int32(v) => *v as i128,
            ScalarValue::Int64(v) => *v as i128,
            ScalarValue::UInt8(v) => *v as i128,
            ScalarValue::UInt16(v) => *v as i128,
            ScalarValue::UInt32(v) => *v as i128,
            ScalarValue::UInt64(v) => *v as i128,
            _ => return None,
        })
    }

    /// Numeric value as f64, if this is any numeric type.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float32(v) => Some(*v as f64),
            ScalarValue::Float64(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Cast this value to the given type.
    ///
    /// Only numeric to numeric casts are supported beyond the identity cast.
    /// Numeric casts follow `as` semantics.
    pub fn try_cast(&self, datatype: &DataType) -> Result<ScalarValue> {
        if self.is_null() {
            return Ok(ScalarValue::Null);
        }
        if self.datatype().as_ref() == Some(datatype) {
            return Ok(self.clone());
        }

        let mismatch = || {
            FrameError::type_mismatch(
                "scalar cast",
                datatype,
                self.datatype()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "Null".to_string()),
            )
        };

        if !datatype.is_numeric() {
            return Err(mismatch());
        }

        if let Some(v) = self.as_i128() {
            return Ok(match datatype {
                DataType::Int8 => ScalarValue::Int8(v as i8),
                DataType::Int16 => ScalarValue::Int16(v as i16),
                DataType::Int32 => ScalarValue::Int32(v as i32),
                DataType::Int64 => ScalarValue::Int64(v as i64),
                DataType::UInt8 => ScalarValue::UInt8(v as u8),
                DataType::UInt16 => ScalarValue::UInt16(v as u16),
                DataType::UInt32 => ScalarValue::UInt32(v as u32),
                DataType::UInt64 => ScalarValue::UInt64(v as u64),
                DataType::Float32 => ScalarValue::Float32(v as f32),
                DataType::Float64 => ScalarValue::Float64(v as f64),
                _ => return Err(mismatch()),
            });
        }

        if let Some(v) = self.as_f64() {
            return Ok(match datatype {
                DataType::Int8 => ScalarValue::Int8(v as i8),
                DataType::Int16 => ScalarValue::Int16(v as i16),
                DataType::Int32 => ScalarValue::Int32(v as i32),
                DataType::Int64 => ScalarValue::Int64(v as i64),
                DataType::UInt8 => ScalarValue::UInt8(v as u8),
                DataType::UInt16 => ScalarValue::UInt16(v as u16),
                DataType::UInt32 => ScalarValue::UInt32(v as u32),
                DataType::UInt64 => ScalarValue::UInt64(v as u64),
                DataType::Float32 => ScalarValue::Float32(v as f32),
                DataType::Float64 => ScalarValue::Float64(v),
                _ => return Err(mismatch()),
            });
        }

        Err(mismatch())
    }
}

pub(crate) fn date32_to_naive(days: i32) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(days as i64 * MILLIS_PER_DAY).map(|d| d.date_naive())
}

pub(crate) fn date64_to_naive(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|d| d.naive_utc())
}

pub(crate) fn naive_to_date32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::default(); // 1970-01-01
    date.signed_duration_since(epoch).num_days() as i32
}

pub(crate) fn naive_to_date64(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp_millis()
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
            Self::LargeList(list) => {
                write!(f, "[")?;
                for (idx, v) in list.values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Date32(v) => match date32_to_naive(*v) {
                Some(date) => write!(f, "{date}"),
                None => write!(f, "{v}"),
            },
            Self::Date64(v) => match date64_to_naive(*v) {
                Some(datetime) => write!(f, "{datetime}"),
                None => write!(f, "{v}"),
            },
        }
    }
}

macro_rules! impl_from_native {
    ($native:ty, $variant:ident) => {
        impl From<$native> for ScalarValue {
            fn from(value: $native) -> Self {
                ScalarValue::$variant(value)
            }
        }
    };
}

impl_from_native!(i8, Int8);
impl_from_native!(i16, Int16);
impl_from_native!(i32, Int32);
impl_from_native!(i64, Int64);
impl_from_native!(u8, UInt8);
impl_from_native!(u16, UInt16);
impl_from_native!(u32, UInt32);
impl_from_native!(u64, UInt64);
impl_from_native!(f32, Float32);
impl_from_native!(f64, Float64);
impl_from_native!(bool, Bool);
impl_from_native!(String, Utf8);

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        ScalarValue::Date32(naive_to_date32(value))
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(value: NaiveDateTime) -> Self {
        ScalarValue::Date64(naive_to_date64(value))
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => ScalarValue::Null,
        }
    }
}
