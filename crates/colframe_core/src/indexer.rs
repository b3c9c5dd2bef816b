//! Row and column selection by label, position, mask and range.

use std::ops::{Range, RangeFull};

use colframe_error::{Result, shape_err};

use crate::compute::selection;
use crate::frame::DataFrame;
use crate::series::Series;

/// Selects rows of a dataframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSelector {
    All,
    Position(usize),
    Positions(Vec<usize>),
    /// Keep rows where true, must match the height.
    Mask(Vec<bool>),
    Range(Range<usize>),
}

/// Selects columns of a dataframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    All,
    Label(String),
    Labels(Vec<String>),
    Position(usize),
    Positions(Vec<usize>),
    /// Keep columns where true, must match the width.
    Mask(Vec<bool>),
    Range(Range<usize>),
}

impl From<RangeFull> for RowSelector {
    fn from(_: RangeFull) -> Self {
        RowSelector::All
    }
}

impl From<usize> for RowSelector {
    fn from(value: usize) -> Self {
        RowSelector::Position(value)
    }
}

impl From<Vec<usize>> for RowSelector {
    fn from(value: Vec<usize>) -> Self {
        RowSelector::Positions(value)
    }
}

impl From<&[usize]> for RowSelector {
    fn from(value: &[usize]) -> Self {
        RowSelector::Positions(value.to_vec())
    }
}

impl From<Vec<bool>> for RowSelector {
    fn from(value: Vec<bool>) -> Self {
        RowSelector::Mask(value)
    }
}

impl From<&[bool]> for RowSelector {
    fn from(value: &[bool]) -> Self {
        RowSelector::Mask(value.to_vec())
    }
}

impl<const N: usize> From<[bool; N]> for RowSelector {
    fn from(value: [bool; N]) -> Self {
        RowSelector::Mask(value.to_vec())
    }
}

impl From<Range<usize>> for RowSelector {
    fn from(value: Range<usize>) -> Self {
        RowSelector::Range(value)
    }
}

impl From<RangeFull> for ColumnSelector {
    fn from(_: RangeFull) -> Self {
        ColumnSelector::All
    }
}

impl From<&str> for ColumnSelector {
    fn from(value: &str) -> Self {
        ColumnSelector::Label(value.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(value: String) -> Self {
        ColumnSelector::Label(value)
    }
}

impl From<Vec<&str>> for ColumnSelector {
    fn from(value: Vec<&str>) -> Self {
        ColumnSelector::Labels(value.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for ColumnSelector {
    fn from(value: &[&str]) -> Self {
        ColumnSelector::Labels(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ColumnSelector {
    fn from(value: [&str; N]) -> Self {
        ColumnSelector::Labels(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for ColumnSelector {
    fn from(value: Vec<String>) -> Self {
        ColumnSelector::Labels(value)
    }
}

impl From<usize> for ColumnSelector {
    fn from(value: usize) -> Self {
        ColumnSelector::Position(value)
    }
}

impl From<Vec<usize>> for ColumnSelector {
    fn from(value: Vec<usize>) -> Self {
        ColumnSelector::Positions(value)
    }
}

impl From<Vec<bool>> for ColumnSelector {
    fn from(value: Vec<bool>) -> Self {
        ColumnSelector::Mask(value)
    }
}

impl<const N: usize> From<[bool; N]> for ColumnSelector {
    fn from(value: [bool; N]) -> Self {
        ColumnSelector::Mask(value.to_vec())
    }
}

impl From<Range<usize>> for ColumnSelector {
    fn from(value: Range<usize>) -> Self {
        ColumnSelector::Range(value)
    }
}

/// Result of indexing a dataframe.
#[derive(Debug, Clone, PartialEq)]
pub enum Indexed<'a> {
    /// A single column selected by label with every row, shared with the
    /// parent dataframe.
    Series(&'a Series),
    Frame(DataFrame),
}

impl Indexed<'_> {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Series(s) => (s.len(), 1),
            Self::Frame(df) => df.shape(),
        }
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Self::Series(s) => Some(s),
            Self::Frame(_) => None,
        }
    }

    pub fn into_frame(self) -> Result<DataFrame> {
        match self {
            Self::Series(s) => DataFrame::new(vec![s.clone()]),
            Self::Frame(df) => Ok(df),
        }
    }
}

fn mask_positions(mask: &[bool], len: usize) -> Result<Vec<usize>> {
    selection::check_mask_len(mask.len(), len)?;
    Ok(mask
        .iter()
        .enumerate()
        .filter_map(|(idx, &keep)| keep.then_some(idx))
        .collect())
}

fn range_positions(range: &Range<usize>, len: usize) -> Result<Vec<usize>> {
    if range.start > range.end || range.end > len {
        return Err(shape_err!(
            "Range {}..{} out of bounds for length {len}",
            range.start,
            range.end
        ));
    }
    Ok(range.clone().collect())
}

impl RowSelector {
    /// Resolve to row positions, `None` meaning every row.
    fn resolve(&self, height: usize) -> Result<Option<Vec<usize>>> {
        let positions = match self {
            Self::All => return Ok(None),
            Self::Position(idx) => vec![*idx],
            Self::Positions(positions) => positions.clone(),
            Self::Mask(mask) => return mask_positions(mask, height).map(Some),
            Self::Range(range) => return range_positions(range, height).map(Some),
        };
        selection::check_indices(&positions, height)?;
        Ok(Some(positions))
    }
}

impl ColumnSelector {
    fn resolve(&self, df: &DataFrame) -> Result<Vec<usize>> {
        let positions = match self {
            Self::All => return Ok((0..df.width()).collect()),
            Self::Label(label) => return Ok(vec![df.try_column_index(label)?]),
            Self::Labels(labels) => {
                return labels
                    .iter()
                    .map(|label| df.try_column_index(label))
                    .collect();
            }
            Self::Position(idx) => vec![*idx],
            Self::Positions(positions) => positions.clone(),
            Self::Mask(mask) => return mask_positions(mask, df.width()),
            Self::Range(range) => return range_positions(range, df.width()),
        };
        selection::check_indices(&positions, df.width())?;
        Ok(positions)
    }
}

impl DataFrame {
    /// Select columns, keeping every row.
    ///
    /// A single label returns the column itself.
    pub fn index_columns(&self, columns: impl Into<ColumnSelector>) -> Result<Indexed<'_>> {
        self.index(RowSelector::All, columns)
    }

    /// Select rows then columns.
    ///
    /// Positions and masks are checked against the axis they select from,
    /// out of range positions and mismatched mask lengths are errors.
    ///
    /// Selecting no columns gives a frame of shape `(0, 0)` whatever the row
    /// selection, since a frame without columns has no rows.
    pub fn index(
        &self,
        rows: impl Into<RowSelector>,
        columns: impl Into<ColumnSelector>,
    ) -> Result<Indexed<'_>> {
        let rows = rows.into();
        let columns = columns.into();

        let row_positions = rows.resolve(self.height())?;
        let column_positions = columns.resolve(self)?;

        match (row_positions, &columns) {
            (None, ColumnSelector::Label(_)) => {
                Ok(Indexed::Series(&self.columns()[column_positions[0]]))
            }
            (None, _) => Ok(Indexed::Frame(self.select_positions(&column_positions)?)),
            (Some(rows), _) => {
                let narrowed = self.select_positions(&column_positions)?;
                Ok(Indexed::Frame(narrowed.take_unchecked(&rows)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::frame;
    use crate::scalar::ScalarValue;

    fn abc() -> DataFrame {
        frame! {
            "a" => vec![1_i64, 2, 3],
            "b" => vec![1.0_f64, 2.0, 3.0],
            "c" => vec!["a", "b", "c"],
        }
        .unwrap()
    }

    #[test]
    fn selection_shapes() {
        struct TestCase {
            rows: RowSelector,
            columns: ColumnSelector,
            shape: (usize, usize),
        }

        let cases = [
            TestCase {
                rows: vec![true, false, true].into(),
                columns: "b".into(),
                shape: (2, 1),
            },
            TestCase {
                rows: RowSelector::All,
                columns: vec!["a", "c"].into(),
                shape: (3, 2),
            },
            TestCase {
                rows: vec![0_usize, 2].into(),
                columns: vec![true, true, false].into(),
                shape: (2, 2),
            },
            TestCase {
                rows: (1_usize..3).into(),
                columns: ColumnSelector::All,
                shape: (2, 3),
            },
            TestCase {
                rows: 1_usize.into(),
                columns: vec![2_usize, 0].into(),
                shape: (1, 2),
            },
            TestCase {
                rows: vec![2_usize, 2, 2, 2].into(),
                columns: (0_usize..1).into(),
                shape: (4, 1),
            },
        ];

        let df = abc();
        for case in cases {
            let out = df.index(case.rows.clone(), case.columns.clone()).unwrap();
            assert_eq!(case.shape, out.shape(), "rows: {:?}, columns: {:?}", case.rows, case.columns);
        }
    }

    #[test]
    fn single_label_shares_series() {
        let df = abc();
        let out = df.index_columns("b").unwrap();
        let series = out.as_series().unwrap();
        assert!(std::ptr::eq(series, df.column("b").unwrap()));
    }

    #[test]
    fn rows_then_columns_values() {
        let df = abc();
        let out = df
            .index([false, true, true], ["c", "a"])
            .unwrap()
            .into_frame()
            .unwrap();

        let expected = frame! {
            "c" => vec!["b", "c"],
            "a" => vec![2_i64, 3],
        }
        .unwrap();
        assert!(out.frame_equal(&expected));
        assert_eq!(ScalarValue::from("b"), out.get_row(0).unwrap()[0]);
    }

    #[test]
    fn no_columns_selected() {
        let df = abc();

        let out = df.index([true, true, false], [false, false, false]).unwrap();
        assert_eq!((0, 0), out.shape());

        let out = df.index_columns(Vec::<usize>::new()).unwrap();
        assert_eq!((0, 0), out.shape());
    }

    #[test]
    fn selection_errors() {
        struct TestCase {
            rows: RowSelector,
            columns: ColumnSelector,
            kind: ErrorKind,
        }

        let cases = [
            TestCase {
                rows: vec![true, false].into(),
                columns: ColumnSelector::All,
                kind: ErrorKind::Shape,
            },
            TestCase {
                rows: vec![3_usize].into(),
                columns: ColumnSelector::All,
                kind: ErrorKind::Shape,
            },
            TestCase {
                rows: (1_usize..4).into(),
                columns: ColumnSelector::All,
                kind: ErrorKind::Shape,
            },
            TestCase {
                rows: RowSelector::All,
                columns: "z".into(),
                kind: ErrorKind::Lookup,
            },
            TestCase {
                rows: RowSelector::All,
                columns: vec![5_usize].into(),
                kind: ErrorKind::Shape,
            },
            TestCase {
                rows: RowSelector::All,
                columns: vec![true].into(),
                kind: ErrorKind::Shape,
            },
            TestCase {
                rows: RowSelector::All,
                columns: vec!["a", "a"].into(),
                kind: ErrorKind::Lookup,
            },
        ];

        let df = abc();
        for case in cases {
            let err = df.index(case.rows.clone(), case.columns.clone()).unwrap_err();
            assert_eq!(case.kind, err.kind(), "rows: {:?}, columns: {:?}", case.rows, case.columns);
        }
    }
}
