//! In-memory columnar dataframes.
pub mod array;
pub mod bitmap;
pub mod compute;
pub mod config;
pub mod datatype;
pub mod format;
pub mod frame;
pub mod groupby;
pub mod indexer;
pub mod join;
pub mod scalar;
pub mod series;
pub mod sort;

pub use colframe_error::{ErrorKind, FrameError, Result};
pub use datatype::DataType;
pub use frame::DataFrame;
pub use join::JoinType;
pub use scalar::ScalarValue;
pub use series::Series;
pub use sort::SortOptions;
