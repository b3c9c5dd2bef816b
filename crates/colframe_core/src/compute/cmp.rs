use std::cmp::Ordering;
use std::fmt;

use colframe_error::{FrameError, Result, shape_err};

use crate::array::{Array, BooleanArray};
use crate::datatype::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl CmpOp {
    /// Apply the operator to the result of comparing two values.
    ///
    /// An unordered comparison (NaN) is only true for `NotEq`.
    fn apply(self, ord: Option<Ordering>) -> bool {
        match self {
            Self::Eq => ord == Some(Ordering::Equal),
            Self::NotEq => ord != Some(Ordering::Equal),
            Self::Gt => ord == Some(Ordering::Greater),
            Self::GtEq => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
            Self::Lt => ord == Some(Ordering::Less),
            Self::LtEq => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::NotEq => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
        }
    }
}

/// How values on either side get compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpMode {
    /// Both sides are integers, compared exactly.
    Integer,
    /// At least one side is a float, compared as f64.
    Float,
    /// Same non-numeric type on both sides.
    Native,
}

fn cmp_mode(op: CmpOp, left: &DataType, right: &DataType) -> Result<CmpMode> {
    if left.is_numeric() && right.is_numeric() {
        if left.is_integer() && right.is_integer() {
            return Ok(CmpMode::Integer);
        }
        return Ok(CmpMode::Float);
    }
    if left == right {
        return Ok(CmpMode::Native);
    }
    Err(FrameError::type_mismatch(format!("compare {op}"), left, right))
}

/// Compare two arrays element-wise.
///
/// `right` may have a single row, in which case it's compared against every
/// row in `left`. A null on either side produces a null.
pub fn compare(left: &Array, right: &Array, op: CmpOp) -> Result<BooleanArray> {
    let mode = cmp_mode(op, &left.datatype(), &right.datatype())?;

    let broadcast = right.len() == 1 && left.len() != 1;
    if !broadcast && left.len() != right.len() {
        return Err(shape_err!(
            "Cannot compare arrays of length {} and {}",
            left.len(),
            right.len()
        ));
    }

    let out = (0..left.len())
        .map(|left_idx| {
            let right_idx = if broadcast { 0 } else { left_idx };
            if !left.is_valid(left_idx) || !right.is_valid(right_idx) {
                return None;
            }

            let ord = match mode {
                CmpMode::Integer => {
                    let l = left.i128_value(left_idx)?;
                    let r = right.i128_value(right_idx)?;
                    Some(l.cmp(&r))
                }
                CmpMode::Float => {
                    let l = left.f64_value(left_idx)?;
                    let r = right.f64_value(right_idx)?;
                    l.partial_cmp(&r)
                }
                CmpMode::Native => Some(left.cmp_rows(left_idx, right, right_idx)),
            };

            Some(op.apply(ord))
        })
        .collect();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(arr: &BooleanArray) -> Vec<Option<bool>> {
        arr.iter().collect()
    }

    #[test]
    fn compare_cases() {
        struct TestCase {
            left: Array,
            right: Array,
            op: CmpOp,
            expected: Vec<Option<bool>>,
        }

        let cases = vec![
            TestCase {
                left: Array::from(vec![1_i64, 2, 3]),
                right: Array::from(vec![1_u8, 3, 3]),
                op: CmpOp::Eq,
                expected: vec![Some(true), Some(false), Some(true)],
            },
            TestCase {
                left: Array::from(vec![Some(1_i32), None, Some(3)]),
                right: Array::from(vec![2_i32]),
                op: CmpOp::Lt,
                expected: vec![Some(true), None, Some(false)],
            },
            TestCase {
                left: Array::from(vec![1.5_f64, f64::NAN]),
                right: Array::from(vec![1_i64, 1]),
                op: CmpOp::GtEq,
                expected: vec![Some(true), Some(false)],
            },
            TestCase {
                left: Array::from(vec![f64::NAN]),
                right: Array::from(vec![f64::NAN]),
                op: CmpOp::NotEq,
                expected: vec![Some(true)],
            },
            TestCase {
                left: Array::from(vec!["a", "b", "c"]),
                right: Array::from(vec!["b"]),
                op: CmpOp::GtEq,
                expected: vec![Some(false), Some(true), Some(true)],
            },
            TestCase {
                left: Array::from(vec![true, false]),
                right: Array::from(vec![true, true]),
                op: CmpOp::NotEq,
                expected: vec![Some(false), Some(true)],
            },
            TestCase {
                left: Array::from(vec![u64::MAX]),
                right: Array::from(vec![-1_i64]),
                op: CmpOp::Gt,
                expected: vec![Some(true)],
            },
        ];

        for case in cases {
            let got = compare(&case.left, &case.right, case.op).unwrap();
            assert_eq!(case.expected, values(&got), "op: {}", case.op);
        }
    }

    #[test]
    fn compare_mismatched_types() {
        let left = Array::from(vec!["1"]);
        let right = Array::from(vec![1_i64]);

        let err = compare(&left, &right, CmpOp::Eq).unwrap_err();
        assert_eq!(colframe_error::ErrorKind::Type, err.kind());
    }

    #[test]
    fn compare_mismatched_lengths() {
        let left = Array::from(vec![1_i64, 2, 3]);
        let right = Array::from(vec![1_i64, 2]);

        let err = compare(&left, &right, CmpOp::Eq).unwrap_err();
        assert_eq!(colframe_error::ErrorKind::Shape, err.kind());
    }
}
