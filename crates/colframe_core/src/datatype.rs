use std::fmt;

use colframe_error::{FrameError, Result, not_implemented};
use serde::{Deserialize, Serialize};

/// Identifier for a data type, without any type metadata.
///
/// The declaration order is stable and is what `Ord` follows. Display and
/// enumeration (`DataTypeId::ALL`) rely on it, value comparisons never do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DataTypeId {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    Utf8,
    LargeList,
    Date32,
    Date64,
}

impl DataTypeId {
    /// All type ids, in declaration order. Don't reorder.
    pub const ALL: [DataTypeId; 15] = [
        DataTypeId::Int8,
        DataTypeId::Int16,
        DataTypeId::Int32,
        DataTypeId::Int64,
        DataTypeId::UInt8,
        DataTypeId::UInt16,
        DataTypeId::UInt32,
        DataTypeId::UInt64,
        DataTypeId::Float32,
        DataTypeId::Float64,
        DataTypeId::Bool,
        DataTypeId::Utf8,
        DataTypeId::LargeList,
        DataTypeId::Date32,
        DataTypeId::Date64,
    ];

    /// Short name used when bridging to native storage.
    pub const fn ffi_name(&self) -> &'static str {
        match self {
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "u8",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Bool => "bool",
            Self::Utf8 => "str",
            Self::LargeList => "largelist",
            Self::Date32 => "date32",
            Self::Date64 => "date64",
        }
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8 => write!(f, "Int8"),
            Self::Int16 => write!(f, "Int16"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::UInt8 => write!(f, "UInt8"),
            Self::UInt16 => write!(f, "UInt16"),
            Self::UInt32 => write!(f, "UInt32"),
            Self::UInt64 => write!(f, "UInt64"),
            Self::Float32 => write!(f, "Float32"),
            Self::Float64 => write!(f, "Float64"),
            Self::Bool => write!(f, "Bool"),
            Self::Utf8 => write!(f, "Utf8"),
            Self::LargeList => write!(f, "LargeList"),
            Self::Date32 => write!(f, "Date32"),
            Self::Date64 => write!(f, "Date64"),
        }
    }
}

/// Metadata associated with lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListTypeMeta {
    pub datatype: Box<DataType>,
}

impl ListTypeMeta {
    pub fn new(datatype: DataType) -> Self {
        ListTypeMeta {
            datatype: Box::new(datatype),
        }
    }
}

/// Supported data types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    Utf8,
    /// A list of values all of the same type, 64-bit offsets.
    LargeList(ListTypeMeta),
    /// Days since epoch.
    Date32,
    /// Milliseconds since epoch.
    Date64,
}

/// Fixed-width machine representation of a data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NativeType {
    pub const fn byte_width(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }
}

impl DataType {
    pub fn list(child: DataType) -> Self {
        DataType::LargeList(ListTypeMeta::new(child))
    }

    /// Get the data type id from the data type.
    pub const fn datatype_id(&self) -> DataTypeId {
        match self {
            DataType::Int8 => DataTypeId::Int8,
            DataType::Int16 => DataTypeId::Int16,
            DataType::Int32 => DataTypeId::Int32,
            DataType::Int64 => DataTypeId::Int64,
            DataType::UInt8 => DataTypeId::UInt8,
            DataType::UInt16 => DataTypeId::UInt16,
            DataType::UInt32 => DataTypeId::UInt32,
            DataType::UInt64 => DataTypeId::UInt64,
            DataType::Float32 => DataTypeId::Float32,
            DataType::Float64 => DataTypeId::Float64,
            DataType::Bool => DataTypeId::Bool,
            DataType::Utf8 => DataTypeId::Utf8,
            DataType::LargeList(_) => DataTypeId::LargeList,
            DataType::Date32 => DataTypeId::Date32,
            DataType::Date64 => DataTypeId::Date64,
        }
    }

    /// Try to create a data type from an id.
    ///
    /// Errors for lists since we don't know the child type.
    pub fn try_from_id(id: DataTypeId) -> Result<Self> {
        Ok(match id {
            DataTypeId::Int8 => DataType::Int8,
            DataTypeId::Int16 => DataType::Int16,
            DataTypeId::Int32 => DataType::Int32,
            DataTypeId::Int64 => DataType::Int64,
            DataTypeId::UInt8 => DataType::UInt8,
            DataTypeId::UInt16 => DataType::UInt16,
            DataTypeId::UInt32 => DataType::UInt32,
            DataTypeId::UInt64 => DataType::UInt64,
            DataTypeId::Float32 => DataType::Float32,
            DataTypeId::Float64 => DataType::Float64,
            DataTypeId::Bool => DataType::Bool,
            DataTypeId::Utf8 => DataType::Utf8,
            DataTypeId::LargeList => {
                return Err(FrameError::InvalidArgument(
                    "Cannot create a LargeList datatype without a child type".to_string(),
                ));
            }
            DataTypeId::Date32 => DataType::Date32,
            DataTypeId::Date64 => DataType::Date64,
        })
    }

    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub const fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date32 | DataType::Date64)
    }

    /// Return if this datatype is a list.
    pub const fn is_list(&self) -> bool {
        matches!(self, DataType::LargeList(_))
    }

    /// Map this type to its native fixed-width representation.
    ///
    /// Temporal types map to their underlying integer. Strings, booleans and
    /// lists have no fixed-width representation and are rejected.
    pub fn native_type(&self) -> Result<NativeType> {
        Ok(match self {
            DataType::Int8 => NativeType::I8,
            DataType::Int16 => NativeType::I16,
            DataType::Int32 | DataType::Date32 => NativeType::I32,
            DataType::Int64 | DataType::Date64 => NativeType::I64,
            DataType::UInt8 => NativeType::U8,
            DataType::UInt16 => NativeType::U16,
            DataType::UInt32 => NativeType::U32,
            DataType::UInt64 => NativeType::U64,
            DataType::Float32 => NativeType::F32,
            DataType::Float64 => NativeType::F64,
            DataType::Bool | DataType::Utf8 | DataType::LargeList(_) => {
                not_implemented!("native representation for {self}")
            }
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::LargeList(meta) => write!(f, "LargeList[{}]", meta.datatype),
            other => write!(f, "{}", other.datatype_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_order_is_declaration_order() {
        let mut ids = DataTypeId::ALL;
        ids.sort();
        assert_eq!(DataTypeId::ALL, ids);
        assert_eq!(DataTypeId::Int8, ids[0]);
        assert_eq!(DataTypeId::Date64, ids[14]);
    }

    #[test]
    fn round_trip_ids() {
        for id in DataTypeId::ALL {
            if id == DataTypeId::LargeList {
                assert!(DataType::try_from_id(id).is_err());
                continue;
            }
            let datatype = DataType::try_from_id(id).unwrap();
            assert_eq!(id, datatype.datatype_id());
        }
    }

    #[test]
    fn native_mapping() {
        assert_eq!(NativeType::I32, DataType::Date32.native_type().unwrap());
        assert_eq!(NativeType::F64, DataType::Float64.native_type().unwrap());
        assert_eq!(8, DataType::UInt64.native_type().unwrap().byte_width());

        for rejected in [DataType::Bool, DataType::Utf8, DataType::list(DataType::Int8)] {
            let err = rejected.native_type().unwrap_err();
            assert_eq!(colframe_error::ErrorKind::NotImplemented, err.kind());
        }
    }

    #[test]
    fn display_nested() {
        let dt = DataType::list(DataType::list(DataType::Utf8));
        assert_eq!("LargeList[LargeList[Utf8]]", dt.to_string());
        assert_eq!("str", DataTypeId::Utf8.ffi_name());
    }
}
