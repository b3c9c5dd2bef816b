use std::io::{self, Write};

use colframe_core::{DataFrame, ScalarValue};
use colframe_error::Result;
use tracing::trace;

use crate::dialect::DialectOptions;

/// Writes a dataframe as CSV. Nulls are written as empty fields.
#[derive(Debug)]
pub struct CsvWriter<W> {
    writer: W,
    has_headers: bool,
    dialect: DialectOptions,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        CsvWriter {
            writer,
            has_headers: true,
            dialect: DialectOptions::default(),
        }
    }

    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.dialect.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: u8) -> Self {
        self.dialect.quote = quote;
        self
    }

    pub fn finish(&mut self, df: &DataFrame) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.dialect.delimiter)
            .quote(self.dialect.quote)
            .from_writer(&mut self.writer);

        if self.has_headers {
            csv_writer
                .write_record(df.column_names())
                .map_err(io::Error::from)?;
        }

        let mut record: Vec<String> = Vec::with_capacity(df.width());
        for row in 0..df.height() {
            record.clear();
            for series in df.iter() {
                record.push(format_field(series.array().scalar_at(row)));
            }
            csv_writer.write_record(&record).map_err(io::Error::from)?;
        }

        csv_writer.flush()?;
        trace!(rows = df.height(), "wrote csv");

        Ok(())
    }
}

/// Format a value so that reading it back infers the same type.
fn format_field(scalar: ScalarValue) -> String {
    match scalar {
        ScalarValue::Null => String::new(),
        ScalarValue::Float32(v) => format!("{v:?}"),
        ScalarValue::Float64(v) => format!("{v:?}"),
        ScalarValue::Utf8(v) => v,
        other => other.to_string(),
    }
}
