use std::ops::Deref;

use colframe_error::{FrameError, Result};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::compute::selection;
use crate::config::ExecutionConfig;
use crate::datatype::DataType;
use crate::groupby::GroupBy;
use crate::join::{JoinType, join};
use crate::scalar::ScalarValue;
use crate::series::Series;
use crate::sort::{SortOptions, sort_indices};

/// Build a dataframe from `name => values` pairs.
///
/// Evaluates to `Result<DataFrame>`, failing if the columns differ in length.
///
/// ```
/// use colframe_core::frame;
///
/// let df = frame! {
///     "a" => vec![1_i64, 2, 3],
///     "b" => vec!["x", "y", "z"],
/// }
/// .unwrap();
/// assert_eq!((3, 2), df.shape());
/// ```
#[macro_export]
macro_rules! frame {
    ($($name:expr => $values:expr),* $(,)?) => {
        $crate::frame::DataFrame::new(std::vec![
            $($crate::series::Series::new($name, $values)),*
        ])
    };
}

/// An ordered collection of equally sized, uniquely named columns.
///
/// A dataframe without columns always has a height of zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<Series>,
    height: usize,
}

impl DataFrame {
    /// Create a dataframe from columns.
    ///
    /// Every column must have the same length, and no two columns may share
    /// a name.
    pub fn new(columns: Vec<Series>) -> Result<Self> {
        let height = columns.first().map(|s| s.len()).unwrap_or(0);

        for (idx, col) in columns.iter().enumerate() {
            if col.len() != height {
                return Err(FrameError::LengthMismatch {
                    column: col.name().to_string(),
                    expected: height,
                    got: col.len(),
                });
            }
            if columns[..idx].iter().any(|other| other.name() == col.name()) {
                return Err(FrameError::DuplicateColumn(col.name().to_string()));
            }
        }

        Ok(DataFrame { columns, height })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width())
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.name()).collect()
    }

    pub fn dtypes(&self) -> Vec<DataType> {
        self.columns.iter().map(|s| s.dtype()).collect()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.columns.iter()
    }

    pub fn into_columns(self) -> Vec<Series> {
        self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|s| s.name() == name)
    }

    pub fn try_column_index(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    /// Get a column by name.
    ///
    /// The returned series shares storage with this dataframe.
    pub fn column(&self, name: &str) -> Result<&Series> {
        let idx = self.try_column_index(name)?;
        Ok(&self.columns[idx])
    }

    /// Get a mutable handle to a column for in-place slot assignment.
    pub fn column_mut(&mut self, name: &str) -> Result<ColumnMut<'_>> {
        let idx = self.try_column_index(name)?;
        Ok(ColumnMut {
            series: &mut self.columns[idx],
        })
    }

    pub fn select_at_idx(&self, idx: usize) -> Option<&Series> {
        self.columns.get(idx)
    }

    /// Select columns by name, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<DataFrame> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        // Repeated names are rejected by `new`.
        DataFrame::new(columns)
    }

    /// Select columns by position, in the order given.
    pub fn select_positions(&self, positions: &[usize]) -> Result<DataFrame> {
        selection::check_indices(positions, self.width())?;
        let columns = positions.iter().map(|&idx| self.columns[idx].clone()).collect();
        DataFrame::new(columns)
    }

    fn check_new_column(&self, series: &Series, replacing: Option<usize>) -> Result<()> {
        if !self.columns.is_empty() && series.len() != self.height {
            return Err(FrameError::LengthMismatch {
                column: series.name().to_string(),
                expected: self.height,
                got: series.len(),
            });
        }
        if let Some(existing) = self.column_index(series.name()) {
            if Some(existing) != replacing {
                return Err(FrameError::DuplicateColumn(series.name().to_string()));
            }
        }
        Ok(())
    }

    /// Replace the column with the same name as `series`, or append it if no
    /// such column exists.
    pub fn set_column(&mut self, series: Series) -> Result<()> {
        let existing = self.column_index(series.name());
        self.check_new_column(&series, existing)?;

        if self.columns.is_empty() {
            self.height = series.len();
        }
        match existing {
            Some(idx) => self.columns[idx] = series,
            None => self.columns.push(series),
        }
        Ok(())
    }

    /// Append columns to the right, returning a new dataframe.
    pub fn hstack(&self, columns: &[Series]) -> Result<DataFrame> {
        let mut df = self.clone();
        df.hstack_mut(columns)?;
        Ok(df)
    }

    /// Append columns to the right of this dataframe.
    ///
    /// Nothing is appended if any column fails validation.
    pub fn hstack_mut(&mut self, columns: &[Series]) -> Result<&mut Self> {
        let mut stacked = self.columns.clone();
        stacked.extend_from_slice(columns);
        *self = DataFrame::new(stacked)?;
        Ok(self)
    }

    /// Return a new dataframe without the named column.
    pub fn drop(&self, name: &str) -> Result<DataFrame> {
        let mut df = self.clone();
        df.drop_in_place(name)?;
        Ok(df)
    }

    /// Remove the named column from this dataframe and return it.
    pub fn drop_in_place(&mut self, name: &str) -> Result<Series> {
        let idx = self.try_column_index(name)?;
        let series = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.height = 0;
        }
        Ok(series)
    }

    /// Replace the column named `label` with `series`.
    ///
    /// The column keeps its position but takes the name of `series`.
    pub fn replace(&mut self, label: &str, series: Series) -> Result<()> {
        let idx = self.try_column_index(label)?;
        self.check_new_column(&series, Some(idx))?;
        self.columns[idx] = series;
        Ok(())
    }

    /// Check that two dataframes have the same columns, in the same order,
    /// holding the same values.
    pub fn frame_equal(&self, other: &DataFrame) -> bool {
        self.shape() == other.shape()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name() == b.name() && a.series_equal(b))
    }

    /// Apply a column transformation, running per column in parallel for
    /// large outputs.
    fn map_columns<F>(&self, height: usize, f: F) -> DataFrame
    where
        F: Fn(&Series) -> Series + Send + Sync,
    {
        let parallel = height >= ExecutionConfig::global().parallel_gather_min_rows;
        trace!(height, width = self.width(), parallel, "gathering columns");

        let columns = if parallel {
            self.columns.par_iter().map(&f).collect()
        } else {
            self.columns.iter().map(&f).collect()
        };

        if self.columns.is_empty() {
            return DataFrame::empty();
        }
        DataFrame { columns, height }
    }

    /// Gather rows by position without checking bounds.
    pub(crate) fn take_unchecked(&self, indices: &[usize]) -> DataFrame {
        self.map_columns(indices.len(), |s| s.take_unchecked(indices))
    }

    /// Gather rows by position, a `None` position producing a null row.
    pub(crate) fn take_opt_unchecked(&self, indices: &[Option<usize>]) -> DataFrame {
        self.map_columns(indices.len(), |s| s.take_opt_unchecked(indices))
    }

    /// Gather rows by position.
    pub fn take(&self, indices: &[usize]) -> Result<DataFrame> {
        selection::check_indices(indices, self.height)?;
        Ok(self.take_unchecked(indices))
    }

    /// Keep the rows where the boolean mask is true.
    pub fn filter(&self, mask: &Series) -> Result<DataFrame> {
        let mask = mask.as_mask()?;
        selection::check_mask_len(mask.len(), self.height)?;
        Ok(self.take_unchecked(&selection::mask_indices(mask)))
    }

    /// Rows `[offset, offset + length)`, clipped to the height.
    pub fn slice(&self, offset: usize, length: usize) -> DataFrame {
        let bounds = selection::slice_bounds(self.height, offset, length);
        let height = bounds.len();
        self.map_columns(height, |s| s.slice(bounds.start, height))
    }

    pub fn head(&self, n: usize) -> DataFrame {
        self.slice(0, n)
    }

    pub fn tail(&self, n: usize) -> DataFrame {
        self.slice(self.height.saturating_sub(n), n)
    }

    /// Get the values of a single row.
    pub fn get_row(&self, idx: usize) -> Result<Vec<ScalarValue>> {
        self.columns.iter().map(|s| s.get(idx)).collect()
    }

    fn sorted_indices(&self, by: &[&str], options: &[SortOptions]) -> Result<Vec<usize>> {
        if by.is_empty() {
            return Err(FrameError::InvalidArgument(
                "Sort requires at least one key column".to_string(),
            ));
        }
        if options.len() != by.len() {
            return Err(FrameError::InvalidArgument(format!(
                "Got {} sort options for {} key columns",
                options.len(),
                by.len()
            )));
        }

        let keys = by
            .iter()
            .zip(options)
            .map(|(name, opts)| Ok((self.column(name)?.array(), *opts)))
            .collect::<Result<Vec<_>>>()?;

        debug!(rows = self.height, keys = keys.len(), "sorting dataframe");

        Ok(sort_indices(&keys))
    }

    /// Stable sort by one or more keys, each with its own ordering.
    pub fn sort_by(&self, by: &[&str], options: &[SortOptions]) -> Result<DataFrame> {
        let indices = self.sorted_indices(by, options)?;
        Ok(self.take_unchecked(&indices))
    }

    /// Stable ascending sort by a column, nulls last.
    pub fn sort(&self, by: &str) -> Result<DataFrame> {
        self.sort_by(&[by], &[SortOptions::default()])
    }

    /// Stable ascending sort of this dataframe's rows, nulls last.
    pub fn sort_in_place(&mut self, by: &str) -> Result<()> {
        let indices = self.sorted_indices(&[by], &[SortOptions::default()])?;
        *self = self.take_unchecked(&indices);
        Ok(())
    }

    /// Group rows by the values of one or more key columns.
    pub fn groupby(&self, by: &[&str]) -> Result<GroupBy<'_>> {
        GroupBy::try_new(self, by)
    }

    /// Equality join with another dataframe.
    pub fn join(
        &self,
        other: &DataFrame,
        left_on: &[&str],
        right_on: &[&str],
        how: JoinType,
    ) -> Result<DataFrame> {
        join(self, other, left_on, right_on, how)
    }
}

/// Mutable access to a single column.
///
/// Only slot assignment is exposed, the name and length of the column can't
/// change through this handle.
#[derive(Debug)]
pub struct ColumnMut<'a> {
    series: &'a mut Series,
}

impl ColumnMut<'_> {
    pub fn set_at_mask(&mut self, mask: &Series, value: impl Into<ScalarValue>) -> Result<()> {
        self.series.set_at_mask(mask, value)
    }

    pub fn set_at_indices(
        &mut self,
        indices: &[usize],
        value: impl Into<ScalarValue>,
    ) -> Result<()> {
        self.series.set_at_indices(indices, value)
    }

    pub fn set_at_mask_from(&mut self, mask: &Series, values: &Series) -> Result<()> {
        self.series.set_at_mask_from(mask, values)
    }
}

impl Deref for ColumnMut<'_> {
    type Target = Series;

    fn deref(&self) -> &Self::Target {
        self.series
    }
}
