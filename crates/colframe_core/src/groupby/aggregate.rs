//! Per-group reductions.

use std::fmt::{self, Debug};
use std::ops::Add;

use colframe_error::{FrameError, Result};
use num_traits::{AsPrimitive, CheckedAdd};

use crate::array::{Array, NativeValue, PrimitiveArray};

/// State for a single group's aggregate.
///
/// An example state for SUM would be a struct that takes a running sum from
/// values provided in `update`.
pub trait AggregateState<Input, Output>: Default + Debug {
    /// Update this state with some input.
    fn update(&mut self, input: Input) -> Result<()>;

    /// Produce a single value from the state, along with a bool indicating if
    /// the value is valid.
    fn finalize(&mut self) -> Result<(Output, bool)>;
}

#[derive(Debug, Default)]
pub struct SumStateAdd<T> {
    sum: T,
    valid: bool,
}

impl<T> AggregateState<T, T> for SumStateAdd<T>
where
    T: Add<Output = T> + Copy + Default + Debug,
{
    fn update(&mut self, input: T) -> Result<()> {
        self.sum = self.sum + input;
        self.valid = true;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(T, bool)> {
        Ok((self.sum, self.valid))
    }
}

/// Integer sum that errors instead of wrapping or panicking on overflow.
#[derive(Debug, Default)]
pub struct SumStateCheckedAdd<T> {
    sum: T,
    valid: bool,
}

impl<T> AggregateState<T, T> for SumStateCheckedAdd<T>
where
    T: CheckedAdd + Copy + Default + Debug,
{
    fn update(&mut self, input: T) -> Result<()> {
        self.sum = self.sum.checked_add(&input).ok_or_else(|| {
            FrameError::InvalidArgument(format!("Integer overflow in sum, adding {input:?}"))
        })?;
        self.valid = true;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(T, bool)> {
        Ok((self.sum, self.valid))
    }
}

#[derive(Debug, Default)]
pub struct AvgStateF64 {
    sum: f64,
    count: i64,
}

impl AggregateState<f64, f64> for AvgStateF64 {
    fn update(&mut self, input: f64) -> Result<()> {
        self.sum += input;
        self.count += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(f64, bool)> {
        if self.count == 0 {
            return Ok((0.0, false));
        }
        Ok((self.sum / self.count as f64, true))
    }
}

/// Counts non-null inputs. Always valid, even for empty groups.
#[derive(Debug, Default)]
pub struct CountNonNullState {
    count: u64,
}

impl AggregateState<(), u64> for CountNonNullState {
    fn update(&mut self, _input: ()) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(u64, bool)> {
        Ok((self.count, true))
    }
}

/// Run a fresh state over some inputs.
fn run_state<S, I, O>(inputs: impl Iterator<Item = I>) -> Result<Option<O>>
where
    S: AggregateState<I, O>,
{
    let mut state = S::default();
    for input in inputs {
        state.update(input)?;
    }
    let (out, valid) = state.finalize()?;
    Ok(valid.then_some(out))
}

/// The reductions available on a grouped column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggKind {
    Sum,
    Min,
    Max,
    Mean,
    First,
    Last,
    Count,
    NUnique,
    /// Quantile in `[0, 1]` with linear interpolation.
    Quantile(f64),
}

impl fmt::Display for AggKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
            Self::Mean => write!(f, "mean"),
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::Count => write!(f, "count"),
            Self::NUnique => write!(f, "n_unique"),
            Self::Quantile(q) => write!(f, "quantile({q})"),
        }
    }
}

/// Reduce each group of rows in `array` to a single value.
///
/// Nulls are skipped. A group with no valid values produces a null for every
/// aggregate except `Count`, which produces zero.
pub fn aggregate(array: &Array, groups: &[Vec<usize>], kind: AggKind) -> Result<Array> {
    match kind {
        AggKind::Sum => sum(array, groups),
        AggKind::Mean => mean(array, groups),
        AggKind::Min | AggKind::Max | AggKind::First | AggKind::Last => {
            let rows = select_rows(array, groups, kind);
            Ok(array.take_opt(&rows))
        }
        AggKind::Count => {
            let counts = groups
                .iter()
                .map(|rows| {
                    let valid = rows.iter().filter(|&&row| array.is_valid(row)).map(|_| ());
                    run_state::<CountNonNullState, _, _>(valid)
                })
                .collect::<Result<PrimitiveArray<u64>>>()?;
            Ok(Array::UInt64(counts))
        }
        AggKind::NUnique => Ok(Array::UInt64(n_unique(array, groups))),
        AggKind::Quantile(q) => quantile(array, groups, q),
    }
}

fn sum_primitive<T, O, S>(
    arr: &PrimitiveArray<T>,
    groups: &[Vec<usize>],
) -> Result<PrimitiveArray<O>>
where
    T: NativeValue + AsPrimitive<O>,
    O: NativeValue,
    S: AggregateState<O, O>,
{
    groups
        .iter()
        .map(|rows| {
            let values = rows
                .iter()
                .filter_map(|&row| arr.value(row))
                .map(AsPrimitive::<O>::as_);
            run_state::<S, _, _>(values)
        })
        .collect()
}

fn sum(array: &Array, groups: &[Vec<usize>]) -> Result<Array> {
    Ok(match array {
        Array::Int8(arr) => Array::Int64(sum_primitive::<_, _, SumStateCheckedAdd<i64>>(arr, groups)?),
        Array::Int16(arr) => Array::Int64(sum_primitive::<_, _, SumStateCheckedAdd<i64>>(arr, groups)?),
        Array::Int32(arr) => Array::Int64(sum_primitive::<_, _, SumStateCheckedAdd<i64>>(arr, groups)?),
        Array::Int64(arr) => Array::Int64(sum_primitive::<_, _, SumStateCheckedAdd<i64>>(arr, groups)?),
        Array::UInt8(arr) => Array::UInt64(sum_primitive::<_, _, SumStateCheckedAdd<u64>>(arr, groups)?),
        Array::UInt16(arr) => Array::UInt64(sum_primitive::<_, _, SumStateCheckedAdd<u64>>(arr, groups)?),
        Array::UInt32(arr) => Array::UInt64(sum_primitive::<_, _, SumStateCheckedAdd<u64>>(arr, groups)?),
        Array::UInt64(arr) => Array::UInt64(sum_primitive::<_, _, SumStateCheckedAdd<u64>>(arr, groups)?),
        Array::Float32(arr) => Array::Float32(sum_primitive::<_, _, SumStateAdd<f32>>(arr, groups)?),
        Array::Float64(arr) => Array::Float64(sum_primitive::<_, _, SumStateAdd<f64>>(arr, groups)?),
        Array::Bool(arr) => {
            let sums = groups
                .iter()
                .map(|rows| {
                    let values = rows
                        .iter()
                        .filter_map(|&row| arr.value(row))
                        .map(u64::from);
                    run_state::<SumStateCheckedAdd<u64>, _, _>(values)
                })
                .collect::<Result<PrimitiveArray<u64>>>()?;
            Array::UInt64(sums)
        }
        other => {
            return Err(FrameError::type_mismatch(
                "sum",
                "numeric or Bool",
                other.datatype(),
            ));
        }
    })
}

/// Numeric value of a row, booleans counting as 0 or 1.
fn numeric_f64(array: &Array, row: usize) -> Option<f64> {
    match array {
        Array::Bool(arr) => arr.value(row).map(|v| if v { 1.0 } else { 0.0 }),
        other => other.f64_value(row),
    }
}

fn mean(array: &Array, groups: &[Vec<usize>]) -> Result<Array> {
    let datatype = array.datatype();
    if !datatype.is_numeric() && !matches!(array, Array::Bool(_)) {
        return Err(FrameError::type_mismatch("mean", "numeric or Bool", datatype));
    }

    let means = groups
        .iter()
        .map(|rows| {
            let values = rows.iter().filter_map(|&row| numeric_f64(array, row));
            run_state::<AvgStateF64, _, _>(values)
        })
        .collect::<Result<PrimitiveArray<f64>>>()?;

    Ok(Array::Float64(means))
}

/// Pick a single row per group, `None` when the group has no valid rows.
fn select_rows(array: &Array, groups: &[Vec<usize>], kind: AggKind) -> Vec<Option<usize>> {
    groups
        .iter()
        .map(|rows| {
            let mut valid = rows.iter().copied().filter(|&row| array.is_valid(row));
            match kind {
                AggKind::First => valid.next(),
                AggKind::Last => valid.last(),
                AggKind::Min => valid.min_by(|&a, &b| array.cmp_rows(a, array, b)),
                AggKind::Max => valid.max_by(|&a, &b| array.cmp_rows(a, array, b)),
                _ => None,
            }
        })
        .collect()
}

fn n_unique(array: &Array, groups: &[Vec<usize>]) -> PrimitiveArray<u64> {
    groups
        .iter()
        .map(|rows| {
            let mut valid: Vec<_> = rows
                .iter()
                .copied()
                .filter(|&row| array.is_valid(row))
                .collect();
            if valid.is_empty() {
                return None;
            }

            valid.sort_by(|&a, &b| array.cmp_rows(a, array, b));
            let distinct = 1 + valid
                .windows(2)
                .filter(|w| !array.rows_eq(w[0], array, w[1]))
                .count();

            Some(distinct as u64)
        })
        .collect()
}

fn quantile(array: &Array, groups: &[Vec<usize>], q: f64) -> Result<Array> {
    if !(0.0..=1.0).contains(&q) {
        return Err(FrameError::InvalidArgument(format!(
            "Quantile must be between 0 and 1, got {q}"
        )));
    }
    let datatype = array.datatype();
    if !datatype.is_numeric() {
        return Err(FrameError::type_mismatch("quantile", "numeric", datatype));
    }

    let values = groups
        .iter()
        .map(|rows| {
            let mut values: Vec<_> = rows
                .iter()
                .filter_map(|&row| array.f64_value(row))
                .collect();
            if values.is_empty() {
                return None;
            }
            values.sort_by(<f64 as NativeValue>::total_cmp);

            let pos = q * (values.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;

            Some(values[lo] + (values[hi] - values[lo]) * frac)
        })
        .collect();

    Ok(Array::Float64(values))
}
