use std::io::Read;
use std::str::FromStr;

use colframe_core::array::Array;
use colframe_core::config::ExecutionConfig;
use colframe_core::{DataFrame, Series};
use colframe_error::{FrameError, Result};
use tracing::debug;

use crate::decoder::{CompletedRecords, decode_all};
use crate::dialect::DialectOptions;
use crate::infer::{CandidateType, infer_types};

/// Reads CSV input into a dataframe, inferring column types.
///
/// ```
/// use colframe_csv::CsvReader;
///
/// let df = CsvReader::new("a,b\n1,x\n2,y\n".as_bytes())
///     .has_headers(true)
///     .finish()
///     .unwrap();
/// assert_eq!((2, 2), df.shape());
/// ```
#[derive(Debug)]
pub struct CsvReader<R> {
    reader: R,
    has_headers: bool,
    dialect: DialectOptions,
    infer_schema_length: usize,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        CsvReader {
            reader,
            has_headers: true,
            dialect: DialectOptions::default(),
            infer_schema_length: ExecutionConfig::global().csv_infer_sample_rows,
        }
    }

    /// Whether the first record holds the column names.
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

    /// Number of records used to infer column types.
    pub fn infer_schema_length(mut self, len: usize) -> Self {
        self.infer_schema_length = len;
        self
    }

    pub fn finish(mut self) -> Result<DataFrame> {
        let mut input = Vec::new();
        self.reader.read_to_end(&mut input)?;

        let state = decode_all(self.dialect, &input)?;
        let records = state.completed_records();
        if records.num_completed() == 0 {
            return Err(FrameError::parse("CSV", "input contains no records"));
        }

        let (names, start) = if self.has_headers {
            let header = records
                .get_record(0)
                .ok_or_else(|| FrameError::parse("CSV", "missing header record"))?;
            let names = header
                .iter()
                .map(|name| name.map(|n| n.to_string()))
                .collect::<Result<Vec<_>>>()?;
            (names, 1)
        } else {
            let names = (0..records.num_fields())
                .map(|idx| format!("column_{idx}"))
                .collect();
            (names, 0)
        };

        let types = infer_types(&records, start, self.infer_schema_length)?;
        debug!(
            rows = records.num_completed() - start,
            ?types,
            "inferred csv column types"
        );

        let columns = names
            .iter()
            .zip(types)
            .enumerate()
            .map(|(col, (name, typ))| build_column(name, typ, &records, col, start))
            .collect::<Result<Vec<_>>>()?;

        DataFrame::new(columns)
    }
}

fn build_column(
    name: &str,
    typ: CandidateType,
    records: &CompletedRecords<'_>,
    col: usize,
    start: usize,
) -> Result<Series> {
    let array = match typ {
        CandidateType::Boolean => Array::from(parse_column::<bool>(name, typ, records, col, start)?),
        CandidateType::Int64 => Array::from(parse_column::<i64>(name, typ, records, col, start)?),
        CandidateType::Float64 => {
            Array::from(parse_column::<f64>(name, typ, records, col, start)?)
        }
        CandidateType::Utf8 => {
            Array::from(parse_column::<String>(name, typ, records, col, start)?)
        }
    };
    Ok(Series::from_array(name, array))
}

/// Parse every value of a column. Values past the inference sample that
/// don't fit the inferred type are an error.
fn parse_column<T: FromStr>(
    name: &str,
    typ: CandidateType,
    records: &CompletedRecords<'_>,
    col: usize,
    start: usize,
) -> Result<Vec<Option<T>>> {
    records
        .iter()
        .skip(start)
        .map(|record| {
            let field = record.get_field(col)?;
            if field.is_empty() {
                return Ok(None);
            }
            field.parse::<T>().map(Some).map_err(|_| {
                FrameError::parse(
                    "CSV",
                    format!(
                        "could not parse '{field}' as {} in column '{name}'",
                        typ.as_datatype()
                    ),
                )
            })
        })
        .collect()
}
