//! Column type inference from CSV fields.

use colframe_core::DataType;
use colframe_error::Result;

use crate::decoder::CompletedRecords;

/// Candidate types used when trying to infer the types for a file.
///
/// Variants are ordered from the narrowest to the widest type allowing for
/// comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateType {
    /// Boolean type, strictest.
    Boolean,
    Int64,
    Float64,
    /// Utf8 type, this should be able to encompass any field.
    Utf8,
}

impl CandidateType {
    pub fn as_datatype(&self) -> DataType {
        match self {
            Self::Boolean => DataType::Bool,
            Self::Int64 => DataType::Int64,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
        }
    }

    /// Check if this candidate type is valid for some input.
    pub fn is_valid(&self, input: &str) -> bool {
        match self {
            Self::Boolean => input.parse::<bool>().is_ok(),
            Self::Int64 => input.parse::<i64>().is_ok(),
            Self::Float64 => input.parse::<f64>().is_ok(),
            Self::Utf8 => true,
        }
    }

    /// Widen this candidate until it accepts the input.
    pub fn update_from_input(&mut self, input: &str) {
        while !self.is_valid(input) {
            *self = match self {
                Self::Boolean => Self::Int64,
                Self::Int64 => Self::Float64,
                Self::Float64 | Self::Utf8 => Self::Utf8,
            };
        }
    }
}

/// Infer a type for each column from up to `sample` records starting at
/// record `start`.
///
/// Empty fields are nulls and don't affect inference. Columns with no
/// non-empty values are Utf8.
pub fn infer_types(
    records: &CompletedRecords<'_>,
    start: usize,
    sample: usize,
) -> Result<Vec<CandidateType>> {
    let mut candidates: Vec<Option<CandidateType>> = vec![None; records.num_fields()];

    for record in records.iter().skip(start).take(sample) {
        for (candidate, field) in candidates.iter_mut().zip(record.iter()) {
            let field = field?;
            if field.is_empty() {
                continue;
            }
            candidate
                .get_or_insert(CandidateType::Boolean)
                .update_from_input(field);
        }
    }

    Ok(candidates
        .into_iter()
        .map(|c| c.unwrap_or(CandidateType::Utf8))
        .collect())
}
