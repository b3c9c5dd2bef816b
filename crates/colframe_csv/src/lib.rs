//! CSV reading and writing for dataframes.
pub mod decoder;
pub mod dialect;
pub mod infer;
pub mod reader;
pub mod writer;

pub use dialect::DialectOptions;
pub use reader::CsvReader;
pub use writer::CsvWriter;
