use std::sync::Arc;

use colframe_error::{FrameError, Result, shape_err};

use crate::array::{Array, BooleanArray};
use crate::compute::cmp::{CmpOp, compare};
use crate::compute::selection;
use crate::datatype::DataType;
use crate::groupby::aggregate::{AggKind, aggregate};
use crate::scalar::ScalarValue;

/// A named, typed, null-aware column.
///
/// Cloning is cheap, the underlying array is shared until mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    array: Arc<Array>,
}

impl Series {
    /// Create a series, inferring the data type from the values.
    pub fn new(name: impl Into<String>, values: impl Into<Array>) -> Self {
        Self::from_array(name, values.into())
    }

    pub fn from_array(name: impl Into<String>, array: Array) -> Self {
        Series {
            name: name.into(),
            array: Arc::new(array),
        }
    }

    /// Create a series by repeating a scalar.
    ///
    /// Errors on an untyped null scalar, use `full_null` instead.
    pub fn full(
        name: impl Into<String>,
        value: impl Into<ScalarValue>,
        len: usize,
    ) -> Result<Self> {
        let value = value.into();
        let datatype = value.datatype().ok_or_else(|| {
            FrameError::InvalidArgument(
                "Cannot infer a data type from a null scalar".to_string(),
            )
        })?;
        let array = Array::try_from_scalars(&datatype, std::iter::repeat_n(value, len))?;
        Ok(Self::from_array(name, array))
    }

    /// Create a series of the given type holding only nulls.
    pub fn full_null(name: impl Into<String>, datatype: &DataType, len: usize) -> Self {
        Self::from_array(name, Array::new_nulls(datatype, len))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn dtype(&self) -> DataType {
        self.array.datatype()
    }

    pub fn array(&self) -> &Array {
        &self.array
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    pub fn is_null(&self) -> Series {
        let values: BooleanArray = (0..self.len())
            .map(|idx| !self.array.is_valid(idx))
            .collect();
        Series::from_array(self.name.clone(), Array::Bool(values))
    }

    pub fn is_not_null(&self) -> Series {
        let values: BooleanArray = (0..self.len())
            .map(|idx| self.array.is_valid(idx))
            .collect();
        Series::from_array(self.name.clone(), Array::Bool(values))
    }

    /// Get the value at `idx`.
    pub fn get(&self, idx: usize) -> Result<ScalarValue> {
        if idx >= self.len() {
            return Err(shape_err!(
                "Index {idx} out of range for series of length {}",
                self.len()
            ));
        }
        Ok(self.array.scalar_at(idx))
    }

    /// Iterate over all values as scalars.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = ScalarValue> + '_ {
        (0..self.len()).map(|idx| self.array.scalar_at(idx))
    }

    /// Check that two series hold the same values with nulls in the same
    /// positions. Names are not compared.
    pub fn series_equal(&self, other: &Series) -> bool {
        if self.len() != other.len() || self.dtype() != other.dtype() {
            return false;
        }
        (0..self.len()).all(|idx| self.array.rows_eq(idx, &other.array, idx))
    }

    pub fn compare(&self, other: &Series, op: CmpOp) -> Result<Series> {
        let values = compare(&self.array, &other.array, op)?;
        Ok(Series::from_array(self.name.clone(), Array::Bool(values)))
    }

    pub fn compare_scalar(&self, value: impl Into<ScalarValue>, op: CmpOp) -> Result<Series> {
        let value = value.into();
        let right = match value.datatype() {
            Some(datatype) => Array::try_from_scalars(&datatype, [value])?,
            None => Array::new_nulls(&self.dtype(), 1),
        };
        let values = compare(&self.array, &right, op)?;
        Ok(Series::from_array(self.name.clone(), Array::Bool(values)))
    }

    pub fn eq(&self, other: &Series) -> Result<Series> {
        self.compare(other, CmpOp::Eq)
    }

    pub fn neq(&self, other: &Series) -> Result<Series> {
        self.compare(other, CmpOp::NotEq)
    }

    pub fn gt(&self, other: &Series) -> Result<Series> {
        self.compare(other, CmpOp::Gt)
    }

    pub fn gt_eq(&self, other: &Series) -> Result<Series> {
        self.compare(other, CmpOp::GtEq)
    }

    pub fn lt(&self, other: &Series) -> Result<Series> {
        self.compare(other, CmpOp::Lt)
    }

    pub fn lt_eq(&self, other: &Series) -> Result<Series> {
        self.compare(other, CmpOp::LtEq)
    }

    /// Interpret this series as a boolean mask.
    pub(crate) fn as_mask(&self) -> Result<&BooleanArray> {
        match self.array.as_ref() {
            Array::Bool(mask) => Ok(mask),
            other => Err(FrameError::type_mismatch(
                "mask",
                DataType::Bool,
                other.datatype(),
            )),
        }
    }

    pub fn filter(&self, mask: &Series) -> Result<Series> {
        let array = selection::filter(&self.array, mask.as_mask()?)?;
        Ok(Series::from_array(self.name.clone(), array))
    }

    pub fn take(&self, indices: &[usize]) -> Result<Series> {
        let array = selection::take(&self.array, indices)?;
        Ok(Series::from_array(self.name.clone(), array))
    }

    /// Gather rows without bounds checking the positions up front.
    ///
    /// Panics if a position is out of bounds.
    pub(crate) fn take_unchecked(&self, indices: &[usize]) -> Series {
        Series::from_array(self.name.clone(), self.array.take(indices))
    }

    pub(crate) fn take_opt_unchecked(&self, indices: &[Option<usize>]) -> Series {
        Series::from_array(self.name.clone(), self.array.take_opt(indices))
    }

    /// Rows `[offset, offset + length)`, clipped to the series length.
    pub fn slice(&self, offset: usize, length: usize) -> Series {
        Series::from_array(
            self.name.clone(),
            selection::slice(&self.array, offset, length),
        )
    }

    pub fn head(&self, n: usize) -> Series {
        self.slice(0, n)
    }

    pub fn tail(&self, n: usize) -> Series {
        self.slice(self.len().saturating_sub(n), n)
    }

    fn reduce(&self, kind: AggKind) -> Result<ScalarValue> {
        let all: Vec<_> = (0..self.len()).collect();
        let out = aggregate(&self.array, &[all], kind)?;
        Ok(out.scalar_at(0))
    }

    /// Sum of all non-null values. Booleans count trues.
    pub fn sum(&self) -> Result<ScalarValue> {
        self.reduce(AggKind::Sum)
    }

    pub fn min(&self) -> Result<ScalarValue> {
        self.reduce(AggKind::Min)
    }

    pub fn max(&self) -> Result<ScalarValue> {
        self.reduce(AggKind::Max)
    }

    pub fn mean(&self) -> Result<ScalarValue> {
        self.reduce(AggKind::Mean)
    }

    pub fn n_unique(&self) -> Result<ScalarValue> {
        self.reduce(AggKind::NUnique)
    }

    pub fn quantile(&self, q: f64) -> Result<ScalarValue> {
        self.reduce(AggKind::Quantile(q))
    }

    /// Scalar cast to this series' type.
    fn cast_scalar(&self, value: ScalarValue) -> Result<Array> {
        let datatype = self.dtype();
        let value = value.try_cast(&datatype)?;
        Array::try_from_scalars(&datatype, [value])
    }

    /// Replace the rows at `positions` with rows from `source`.
    ///
    /// `source_row` maps the n-th position to a row in `source`.
    fn assign(
        &mut self,
        positions: &[usize],
        source: &Array,
        source_row: impl Fn(usize) -> usize,
    ) -> Result<()> {
        let mut pairs: Vec<_> = (0..self.len()).map(|row| (0, row)).collect();
        for (n, &pos) in positions.iter().enumerate() {
            pairs[pos] = (1, source_row(n));
        }

        let array = Array::interleave(&[self.array.as_ref(), source], &pairs)?;
        self.array = Arc::new(array);

        Ok(())
    }

    /// Set every row where the mask is true to `value`.
    pub fn set_at_mask(&mut self, mask: &Series, value: impl Into<ScalarValue>) -> Result<()> {
        let mask = mask.as_mask()?;
        selection::check_mask_len(mask.len(), self.len())?;

        let source = self.cast_scalar(value.into())?;
        self.assign(&selection::mask_indices(mask), &source, |_| 0)
    }

    /// Set the rows at the given positions to `value`.
    pub fn set_at_indices(
        &mut self,
        indices: &[usize],
        value: impl Into<ScalarValue>,
    ) -> Result<()> {
        selection::check_indices(indices, self.len())?;

        let source = self.cast_scalar(value.into())?;
        self.assign(indices, &source, |_| 0)
    }

    /// Set the rows where the mask is true to successive values from `values`.
    ///
    /// `values` must have exactly as many rows as the mask selects.
    pub fn set_at_mask_from(&mut self, mask: &Series, values: &Series) -> Result<()> {
        let mask = mask.as_mask()?;
        selection::check_mask_len(mask.len(), self.len())?;

        let positions = selection::mask_indices(mask);
        if positions.len() != values.len() {
            return Err(shape_err!(
                "Mask selects {} rows but {} values were provided",
                positions.len(),
                values.len()
            ));
        }

        let datatype = self.dtype();
        let source = if values.dtype() == datatype {
            values.array.clone()
        } else if values.dtype().is_numeric() && datatype.is_numeric() {
            Arc::new(Array::try_from_scalars(&datatype, values.iter())?)
        } else {
            return Err(FrameError::type_mismatch(
                "set values",
                datatype,
                values.dtype(),
            ));
        };

        self.assign(&positions, &source, |n| n)
    }
}
