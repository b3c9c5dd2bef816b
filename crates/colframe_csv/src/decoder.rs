//! Incremental decoding of CSV bytes into field buffers.

use colframe_error::{FrameError, Result};
use csv_core::{ReadRecordResult, Reader};

use crate::dialect::DialectOptions;

const DATA_BUFFER_SIZE: usize = 4 * 1024;
const END_BUFFER_SIZE: usize = 1024;

fn csv_err(msg: impl std::fmt::Display) -> FrameError {
    FrameError::parse("CSV", msg)
}

#[derive(Debug)]
pub struct DecoderState {
    /// Buffer containing decoded records.
    buffer: Vec<u8>,

    /// Length of decoded data in `buffer`.
    buffer_len: usize,

    /// End offsets for fields in `buffer`.
    ends: Vec<usize>,

    /// Length of end offsets in `ends`.
    ends_len: usize,

    /// Field index in a record we're currently decoding.
    current_field: usize,

    /// Number of fields per record.
    ///
    /// Only set once the first record is complete.
    num_fields: Option<usize>,
}

impl Default for DecoderState {
    fn default() -> Self {
        DecoderState {
            buffer: vec![0; DATA_BUFFER_SIZE],
            buffer_len: 0,
            ends: vec![0; END_BUFFER_SIZE],
            ends_len: 0,
            current_field: 0,
            num_fields: None,
        }
    }
}

impl DecoderState {
    /// Get the number of complete records we've decoded so far.
    pub fn num_records(&self) -> usize {
        match self.num_fields {
            Some(0) | None => 0,
            Some(n) => self.ends_len / n,
        }
    }

    pub fn num_fields(&self) -> Option<usize> {
        self.num_fields
    }

    /// Get the buffer offset where the record currently being written
    /// starts.
    fn relative_start_offset(&self) -> usize {
        let num_completed = self.num_records();
        match self.num_fields {
            Some(n) if num_completed > 0 => self.ends[num_completed * n - 1],
            _ => 0,
        }
    }

    /// Double the data buffer, or the field ends buffer if `ends` is set.
    fn grow(&mut self, ends: bool) {
        if ends {
            self.ends.resize(self.ends.len() * 2, 0);
        } else {
            self.buffer.resize(self.buffer.len() * 2, 0);
        }
    }

    pub fn completed_records(&self) -> CompletedRecords<'_> {
        CompletedRecords { state: self }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletedRecords<'a> {
    state: &'a DecoderState,
}

impl<'a> CompletedRecords<'a> {
    pub fn num_completed(&self) -> usize {
        self.state.num_records()
    }

    pub fn num_fields(&self) -> usize {
        self.state.num_fields.unwrap_or(0)
    }

    pub fn get_record(&self, idx: usize) -> Option<CompletedRecord<'a>> {
        let num_fields = self.state.num_fields?;
        if idx >= self.state.num_records() {
            return None;
        }

        let ends = &self.state.ends[(idx * num_fields)..(idx * num_fields + num_fields)];
        let data_start = if idx == 0 {
            0
        } else {
            self.state.ends[idx * num_fields - 1]
        };

        Some(CompletedRecord {
            record: idx + 1,
            data: &self.state.buffer,
            data_start,
            ends,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = CompletedRecord<'a>> + '_ {
        (0..self.state.num_records()).filter_map(|idx| self.get_record(idx))
    }
}

#[derive(Debug)]
pub struct CompletedRecord<'a> {
    /// One-based record number, used in error messages.
    record: usize,
    data: &'a [u8],
    data_start: usize,
    ends: &'a [usize],
}

impl<'a> CompletedRecord<'a> {
    pub fn num_fields(&self) -> usize {
        self.ends.len()
    }

    pub fn get_field(&self, idx: usize) -> Result<&'a str> {
        let start = if idx == 0 {
            self.data_start
        } else {
            self.ends[idx - 1]
        };
        let end = self.ends[idx];

        std::str::from_utf8(&self.data[start..end]).map_err(|_| {
            csv_err(format!(
                "field {idx} of record {} contains invalid UTF-8 data",
                self.record
            ))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<&'a str>> + '_ {
        (0..self.ends.len()).map(|idx| self.get_field(idx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderResult {
    /// Decoder received empty input, decoding finished.
    Finished,

    /// Input was completely exhausted.
    InputExhausted,

    /// A buffer was full but input was not exhausted. Grow the buffer then
    /// call `decode` again with a sliced input beginning at offset to resume.
    BufferFull { input_offset: usize, ends: bool },
}

#[derive(Debug)]
pub struct CsvDecoder {
    reader: Reader,
}

impl CsvDecoder {
    pub fn new(dialect: DialectOptions) -> Self {
        CsvDecoder {
            reader: dialect.csv_core_reader(),
        }
    }

    /// Decode an input buffer writing decoded fields to `state`.
    ///
    /// An empty input signals the end of the stream, completing any trailing
    /// record without a line terminator.
    pub fn decode(&mut self, input: &[u8], state: &mut DecoderState) -> Result<DecoderResult> {
        let mut input_offset = 0;

        loop {
            // Field ends are relative to the start of the record, adjust them
            // to offsets into the shared buffer.
            let relative_offset = state.relative_start_offset();

            let input = &input[input_offset..];
            let output = &mut state.buffer[state.buffer_len..];
            let ends = &mut state.ends[state.ends_len..];

            let (result, bytes_read, bytes_written, ends_written) =
                self.reader.read_record(input, output, ends);

            for end in ends.iter_mut().take(ends_written) {
                *end += relative_offset;
            }

            input_offset += bytes_read;
            state.buffer_len += bytes_written;
            state.ends_len += ends_written;
            state.current_field += ends_written;

            match result {
                ReadRecordResult::InputEmpty => return Ok(DecoderResult::InputExhausted),
                ReadRecordResult::OutputFull => {
                    return Ok(DecoderResult::BufferFull {
                        input_offset,
                        ends: false,
                    });
                }
                ReadRecordResult::OutputEndsFull => {
                    return Ok(DecoderResult::BufferFull {
                        input_offset,
                        ends: true,
                    });
                }
                ReadRecordResult::Record => {
                    match state.num_fields {
                        Some(num) => {
                            if state.current_field != num {
                                return Err(csv_err(format!(
                                    "record {} has {} fields, expected {num}",
                                    state.num_records() + 1,
                                    state.current_field
                                )));
                            }
                        }
                        None => state.num_fields = Some(state.current_field),
                    }

                    state.current_field = 0;
                }
                ReadRecordResult::End => return Ok(DecoderResult::Finished),
            }
        }
    }
}

/// Decode a complete CSV input.
pub fn decode_all(dialect: DialectOptions, input: &[u8]) -> Result<DecoderState> {
    let mut decoder = CsvDecoder::new(dialect);
    let mut state = DecoderState::default();
    let mut remaining = input;

    loop {
        match decoder.decode(remaining, &mut state)? {
            DecoderResult::Finished => return Ok(state),
            DecoderResult::InputExhausted => {
                if remaining.is_empty() {
                    return Ok(state);
                }
                remaining = &[];
            }
            DecoderResult::BufferFull { input_offset, ends } => {
                state.grow(ends);
                remaining = &remaining[input_offset..];
            }
        }
    }
}
