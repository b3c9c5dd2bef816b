//! Hash equality joins between two dataframes.

use std::fmt;
use std::str::FromStr;

use colframe_error::{FrameError, Result};
use hashbrown::HashSet;
use hashbrown::raw::RawTable;
use tracing::debug;

use crate::array::Array;
use crate::bitmap::Bitmap;
use crate::compute::hash::hash_arrays;
use crate::frame::DataFrame;
use crate::series::Series;

/// Suffix added to right side columns whose names collide with the left.
pub const RIGHT_SUFFIX: &str = "_right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Outer,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "inner"),
            Self::Left => write!(f, "left"),
            Self::Outer => write!(f, "outer"),
        }
    }
}

impl FromStr for JoinType {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "inner" => Self::Inner,
            "left" => Self::Left,
            "outer" => Self::Outer,
            other => {
                return Err(FrameError::InvalidArgument(format!(
                    "Unknown join type: '{other}'"
                )));
            }
        })
    }
}

/// Hash table over the build (right) side keys.
///
/// Rows with a null in any key column are never inserted, so they never
/// match.
struct JoinHashTable<'a> {
    keys: Vec<&'a Array>,
    /// (hash, key index)
    table: RawTable<(u64, usize)>,
    /// Representative row for each distinct key.
    first: Vec<usize>,
    /// All build rows for each distinct key, in row order.
    rows: Vec<Vec<usize>>,
}

impl<'a> JoinHashTable<'a> {
    fn build(keys: Vec<&'a Array>) -> Self {
        let num_rows = keys.first().map(|arr| arr.len()).unwrap_or(0);
        let mut hashes = vec![0; num_rows];
        hash_arrays(&keys, &mut hashes);

        let mut ht = JoinHashTable {
            keys,
            table: RawTable::new(),
            first: Vec::new(),
            rows: Vec::new(),
        };

        for (row, &hash) in hashes.iter().enumerate() {
            if !all_valid(&ht.keys, row) {
                continue;
            }

            let existing = ht
                .table
                .get(hash, |&(entry_hash, key)| {
                    entry_hash == hash && keys_eq(&ht.keys, ht.first[key], &ht.keys, row)
                })
                .map(|&(_, key)| key);

            match existing {
                Some(key) => ht.rows[key].push(row),
                None => {
                    let key = ht.rows.len();
                    ht.first.push(row);
                    ht.rows.push(vec![row]);
                    ht.table.insert(hash, (hash, key), |&(hash, _)| hash);
                }
            }
        }

        ht
    }

    /// Build rows matching a probe row.
    fn probe(&self, probe_keys: &[&Array], row: usize, hash: u64) -> &[usize] {
        if !all_valid(probe_keys, row) {
            return &[];
        }

        self.table
            .get(hash, |&(entry_hash, key)| {
                entry_hash == hash && keys_eq(&self.keys, self.first[key], probe_keys, row)
            })
            .map(|&(_, key)| self.rows[key].as_slice())
            .unwrap_or(&[])
    }
}

fn all_valid(keys: &[&Array], row: usize) -> bool {
    keys.iter().all(|arr| arr.is_valid(row))
}

fn keys_eq(left: &[&Array], left_row: usize, right: &[&Array], right_row: usize) -> bool {
    left.iter()
        .zip(right)
        .all(|(l, r)| l.rows_eq(left_row, r, right_row))
}

/// Output row origins. `None` marks an unmatched side.
#[derive(Debug, Default, PartialEq, Eq)]
struct JoinIndexPairs {
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
}

impl JoinIndexPairs {
    fn push(&mut self, left: Option<usize>, right: Option<usize>) {
        self.left.push(left);
        self.right.push(right);
    }

    fn len(&self) -> usize {
        self.left.len()
    }
}

fn resolve_keys(df: &DataFrame, names: &[&str]) -> Result<Vec<usize>> {
    names.iter().map(|name| df.try_column_index(name)).collect()
}

fn compute_pairs(
    left_keys: &[&Array],
    table: &JoinHashTable<'_>,
    right_rows: usize,
    how: JoinType,
) -> JoinIndexPairs {
    let num_rows = left_keys.first().map(|arr| arr.len()).unwrap_or(0);
    let mut hashes = vec![0; num_rows];
    hash_arrays(left_keys, &mut hashes);

    let mut pairs = JoinIndexPairs::default();
    let mut right_matched = Bitmap::new_with_all_false(right_rows);

    for (left_row, &hash) in hashes.iter().enumerate() {
        let matches = table.probe(left_keys, left_row, hash);
        if matches.is_empty() {
            if how != JoinType::Inner {
                pairs.push(Some(left_row), None);
            }
            continue;
        }

        for &right_row in matches {
            right_matched.set(right_row, true);
            pairs.push(Some(left_row), Some(right_row));
        }
    }

    if how == JoinType::Outer {
        for (right_row, matched) in right_matched.iter().enumerate() {
            if !matched {
                pairs.push(None, Some(right_row));
            }
        }
    }

    pairs
}

/// Join two dataframes on equality of key columns.
///
/// Output rows follow the left row order, each left row producing one row
/// per matching right row. Outer joins append unmatched right rows at the
/// end. Key columns appear once, under their left names, and right columns
/// whose names collide with a left column get a `_right` suffix.
pub fn join(
    left: &DataFrame,
    right: &DataFrame,
    left_on: &[&str],
    right_on: &[&str],
    how: JoinType,
) -> Result<DataFrame> {
    if left_on.is_empty() || left_on.len() != right_on.len() {
        return Err(FrameError::InvalidArgument(format!(
            "Join requires the same non-zero number of keys on each side, got {} and {}",
            left_on.len(),
            right_on.len()
        )));
    }

    let left_key_idx = resolve_keys(left, left_on)?;
    let right_key_idx = resolve_keys(right, right_on)?;

    let left_keys: Vec<_> = left_key_idx
        .iter()
        .map(|&idx| left.columns()[idx].array())
        .collect();
    let right_keys: Vec<_> = right_key_idx
        .iter()
        .map(|&idx| right.columns()[idx].array())
        .collect();

    for ((l, r), name) in left_keys.iter().zip(&right_keys).zip(left_on) {
        if l.datatype() != r.datatype() {
            return Err(FrameError::type_mismatch(
                format!("join key '{name}'"),
                l.datatype(),
                r.datatype(),
            ));
        }
    }

    let table = JoinHashTable::build(right_keys.clone());
    let pairs = compute_pairs(&left_keys, &table, right.height(), how);

    debug!(
        %how,
        left_rows = left.height(),
        right_rows = right.height(),
        distinct_keys = table.rows.len(),
        output_rows = pairs.len(),
        "computed join"
    );

    let mut columns = left.take_opt_unchecked(&pairs.left).into_columns();

    if how == JoinType::Outer {
        // Right only rows take their key values from the right side.
        let sources: Vec<_> = pairs
            .left
            .iter()
            .zip(&pairs.right)
            .map(|(l, r)| match (l, r) {
                (Some(l), _) => (0, *l),
                (None, Some(r)) => (1, *r),
                (None, None) => unreachable!("join row without an origin"),
            })
            .collect();

        for (&left_idx, right_key) in left_key_idx.iter().zip(&right_keys) {
            let left_key = left.columns()[left_idx].array();
            let coalesced = Array::interleave(&[left_key, right_key], &sources)?;
            columns[left_idx] = Series::from_array(left.columns()[left_idx].name(), coalesced);
        }
    }

    let right_positions: Vec<_> = (0..right.width())
        .filter(|idx| !right_key_idx.contains(idx))
        .collect();
    let right_cols = right
        .select_positions(&right_positions)?
        .take_opt_unchecked(&pairs.right);

    // Suffixed names must avoid every left name and every right name.
    let mut taken: HashSet<String> = left
        .column_names()
        .into_iter()
        .chain(right_cols.column_names())
        .map(|name| name.to_string())
        .collect();

    for series in right_cols.into_columns() {
        if left.column_index(series.name()).is_some() {
            let mut name = format!("{}{RIGHT_SUFFIX}", series.name());
            while taken.contains(&name) {
                name.push_str(RIGHT_SUFFIX);
            }
            taken.insert(name.clone());
            columns.push(series.with_name(name));
        } else {
            columns.push(series);
        }
    }

    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;
    use crate::frame;
    use crate::scalar::ScalarValue;

    fn left() -> DataFrame {
        frame! {
            "a" => vec!["a", "b", "a", "z"],
            "b" => vec![1_i64, 2, 3, 4],
        }
        .unwrap()
    }

    fn right() -> DataFrame {
        frame! {
            "a" => vec!["b", "c", "b", "a"],
            "k" => vec![0_i64, 3, 9, 6],
        }
        .unwrap()
    }

    #[test]
    fn join_type_from_str() {
        assert_eq!(JoinType::Outer, "outer".parse().unwrap());
        assert_eq!(JoinType::Inner, "inner".parse().unwrap());
        let err = "cross".parse::<JoinType>().unwrap_err();
        assert_eq!(ErrorKind::Argument, err.kind());
    }

    #[test]
    fn inner_join() {
        let out = join(&left(), &right(), &["a"], &["a"], JoinType::Inner).unwrap();
        let expected = frame! {
            "a" => vec!["a", "b", "b", "a"],
            "b" => vec![1_i64, 2, 2, 3],
            "k" => vec![6_i64, 0, 9, 6],
        }
        .unwrap();
        assert!(out.frame_equal(&expected), "{out:?}");
    }

    #[test]
    fn left_join() {
        let out = join(&left(), &right(), &["a"], &["a"], JoinType::Left).unwrap();
        let expected = frame! {
            "a" => vec!["a", "b", "b", "a", "z"],
            "b" => vec![1_i64, 2, 2, 3, 4],
            "k" => vec![Some(6_i64), Some(0), Some(9), Some(6), None],
        }
        .unwrap();
        assert!(out.frame_equal(&expected), "{out:?}");
    }

    #[test]
    fn outer_join() {
        let out = join(&left(), &right(), &["a"], &["a"], JoinType::Outer).unwrap();
        let expected = frame! {
            "a" => vec!["a", "b", "b", "a", "z", "c"],
            "b" => vec![Some(1_i64), Some(2), Some(2), Some(3), Some(4), None],
            "k" => vec![Some(6_i64), Some(0), Some(9), Some(6), None, Some(3)],
        }
        .unwrap();
        assert!(out.frame_equal(&expected), "{out:?}");
    }

    #[test]
    fn colliding_names_suffixed() {
        let right = frame! {
            "key" => vec!["b", "a"],
            "b" => vec![10_i64, 20],
        }
        .unwrap();
        let out = join(&left(), &right, &["a"], &["key"], JoinType::Left).unwrap();

        assert_eq!(vec!["a", "b", "b_right"], out.column_names());
        assert_eq!(1, out.column("b_right").unwrap().null_count());
        assert_eq!(ScalarValue::Int64(20), out.column("b_right").unwrap().get(0).unwrap());
    }

    #[test]
    fn suffix_avoids_existing_names() {
        let left = frame! {
            "k" => vec![1_i64, 2],
            "b" => vec!["x", "y"],
            "b_right" => vec![true, false],
        }
        .unwrap();
        let right = frame! {
            "k" => vec![2_i64, 1],
            "b" => vec![20.0_f64, 10.0],
        }
        .unwrap();

        let out = join(&left, &right, &["k"], &["k"], JoinType::Inner).unwrap();
        assert_eq!(vec!["k", "b", "b_right", "b_right_right"], out.column_names());
        assert_eq!(
            ScalarValue::Float64(10.0),
            out.column("b_right_right").unwrap().get(0).unwrap()
        );

        // A right column already named like the suffixed form is skipped too.
        let left = frame! { "k" => vec![1_i64], "b" => vec![1_i64] }.unwrap();
        let right = frame! {
            "k" => vec![1_i64],
            "b" => vec![2_i64],
            "b_right" => vec![3_i64],
        }
        .unwrap();

        let out = join(&left, &right, &["k"], &["k"], JoinType::Inner).unwrap();
        assert_eq!(vec!["k", "b", "b_right_right", "b_right"], out.column_names());
        assert_eq!(ScalarValue::Int64(2), out.column("b_right_right").unwrap().get(0).unwrap());
    }

    #[test]
    fn float_keys_match_by_value() {
        let left = frame! { "k" => vec![0.0_f64, f64::NAN], "v" => vec![1_i64, 2] }.unwrap();
        let right = frame! { "k" => vec![-0.0_f64, -f64::NAN], "w" => vec![3_i64, 4] }.unwrap();

        let out = join(&left, &right, &["k"], &["k"], JoinType::Inner).unwrap();
        assert_eq!(2, out.height());
        assert_eq!(ScalarValue::Int64(3), out.column("w").unwrap().get(0).unwrap());
        assert_eq!(ScalarValue::Int64(4), out.column("w").unwrap().get(1).unwrap());
    }

    #[test]
    fn null_keys_never_match() {
        let left = frame! {
            "k" => vec![None, Some(1_i32)],
            "v" => vec!["x", "y"],
        }
        .unwrap();
        let right = frame! {
            "k" => vec![None, Some(1_i32)],
            "w" => vec![true, false],
        }
        .unwrap();

        let out = join(&left, &right, &["k"], &["k"], JoinType::Inner).unwrap();
        assert_eq!(1, out.height());
        assert_eq!(ScalarValue::Int32(1), out.column("k").unwrap().get(0).unwrap());

        let out = join(&left, &right, &["k"], &["k"], JoinType::Outer).unwrap();
        assert_eq!(3, out.height());
        assert_eq!(2, out.column("k").unwrap().null_count());
    }

    #[test]
    fn multi_key_join() {
        let left = frame! {
            "a" => vec![1_i64, 1, 2],
            "b" => vec!["x", "y", "x"],
        }
        .unwrap();
        let right = frame! {
            "a" => vec![1_i64, 2],
            "b" => vec!["y", "x"],
            "v" => vec![1.5_f64, 2.5],
        }
        .unwrap();

        let out = join(&left, &right, &["a", "b"], &["a", "b"], JoinType::Left).unwrap();
        let expected = frame! {
            "a" => vec![1_i64, 1, 2],
            "b" => vec!["x", "y", "x"],
            "v" => vec![None, Some(1.5_f64), Some(2.5)],
        }
        .unwrap();
        assert!(out.frame_equal(&expected), "{out:?}");
    }

    #[test]
    fn key_errors() {
        let err = join(&left(), &right(), &["a"], &["k"], JoinType::Inner).unwrap_err();
        assert_eq!(ErrorKind::Type, err.kind());

        let err = join(&left(), &right(), &["missing"], &["a"], JoinType::Inner).unwrap_err();
        assert_eq!(ErrorKind::Lookup, err.kind());

        let err = join(&left(), &right(), &[], &[], JoinType::Inner).unwrap_err();
        assert_eq!(ErrorKind::Argument, err.kind());
    }
}
