use std::cmp::Ordering;

use crate::array::Array;

/// How a single sort key orders its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOptions {
    pub descending: bool,
    pub nulls_last: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions {
            descending: false,
            nulls_last: true,
        }
    }
}

impl SortOptions {
    pub const fn ascending() -> Self {
        SortOptions {
            descending: false,
            nulls_last: true,
        }
    }

    pub const fn descending() -> Self {
        SortOptions {
            descending: true,
            nulls_last: true,
        }
    }
}

fn cmp_key(key: &Array, options: SortOptions, left: usize, right: usize) -> Ordering {
    match (key.is_valid(left), key.is_valid(right)) {
        (true, true) => {
            let ord = key.cmp_rows(left, key, right);
            if options.descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (false, false) => Ordering::Equal,
        (false, true) => {
            if options.nulls_last {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (true, false) => {
            if options.nulls_last {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

/// Compute the stable permutation that sorts rows by the given keys.
///
/// Earlier keys take precedence, ties keep their original row order.
pub fn sort_indices(keys: &[(&Array, SortOptions)]) -> Vec<usize> {
    let num_rows = keys.first().map(|(arr, _)| arr.len()).unwrap_or(0);
    let mut indices: Vec<_> = (0..num_rows).collect();

    indices.sort_by(|&a, &b| {
        for (key, options) in keys {
            let ord = cmp_key(key, *options, a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_last_ascending() {
        let key = Array::from(vec![Some(3_i64), None, Some(1), Some(2)]);
        let indices = sort_indices(&[(&key, SortOptions::default())]);
        assert_eq!(vec![2, 3, 0, 1], indices);
    }

    #[test]
    fn descending_nulls_first() {
        let key = Array::from(vec![Some(3_i64), None, Some(1), Some(2)]);
        let options = SortOptions {
            descending: true,
            nulls_last: false,
        };
        let indices = sort_indices(&[(&key, options)]);
        assert_eq!(vec![1, 0, 3, 2], indices);
    }

    #[test]
    fn stable_multi_key() {
        let a = Array::from(vec!["b", "a", "b", "a"]);
        let b = Array::from(vec![1_i32, 2, 1, 1]);

        let indices = sort_indices(&[
            (&a, SortOptions::ascending()),
            (&b, SortOptions::ascending()),
        ]);
        assert_eq!(vec![3, 1, 0, 2], indices);

        let indices = sort_indices(&[(&a, SortOptions::ascending())]);
        assert_eq!(vec![1, 3, 0, 2], indices);
    }

    #[test]
    fn floats_nan_after_values() {
        let key = Array::from(vec![f64::NAN, 1.0, -1.0]);
        let indices = sort_indices(&[(&key, SortOptions::default())]);
        assert_eq!(vec![2, 1, 0], indices);
    }

    #[test]
    fn floats_computed_nan_after_values() {
        let zero = std::hint::black_box(0.0_f64);
        let key = Array::from(vec![1.0, zero / zero, -1.0, -f64::NAN, -0.0, 0.0]);

        let indices = sort_indices(&[(&key, SortOptions::default())]);
        assert_eq!(vec![2, 4, 5, 0, 1, 3], indices);
    }
}
