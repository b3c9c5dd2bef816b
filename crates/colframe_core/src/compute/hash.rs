use ahash::RandomState;

use crate::array::Array;

/// State used for all hashing in grouping and joins.
pub const HASH_RANDOM_STATE: RandomState = RandomState::with_seeds(0, 0, 0, 0);

/// Hash used for every null value.
pub fn null_hash_value() -> u64 {
    HASH_RANDOM_STATE.hash_one(1)
}

/// Combines two hashes into one hash
///
/// This implementation came from datafusion.
pub const fn combine_hashes(l: u64, r: u64) -> u64 {
    let hash = (17 * 37u64).wrapping_add(l);
    hash.wrapping_mul(37).wrapping_add(r)
}

/// Hash the rows of one or more arrays, combining each column's hash into
/// `hashes`.
///
/// All arrays must have the same length as `hashes`.
pub fn hash_arrays(arrays: &[&Array], hashes: &mut [u64]) {
    for (col_idx, array) in arrays.iter().enumerate() {
        debug_assert_eq!(array.len(), hashes.len());
        for (row_idx, hash) in hashes.iter_mut().enumerate() {
            let row_hash = array.hash_row(row_idx, &HASH_RANDOM_STATE);
            *hash = if col_idx == 0 {
                row_hash
            } else {
                combine_hashes(*hash, row_hash)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_column_hashes() {
        let a = Array::from(vec![1_i32, 1, 2, 1]);
        let b = Array::from(vec![Some("x"), Some("x"), Some("x"), None]);

        let mut hashes = vec![0; 4];
        hash_arrays(&[&a, &b], &mut hashes);

        assert_eq!(hashes[0], hashes[1]);
        assert_ne!(hashes[0], hashes[2]);
        assert_ne!(hashes[0], hashes[3]);
    }

    #[test]
    fn nulls_hash_the_same_across_types() {
        let a = Array::from(vec![None::<i8>]);
        let b = Array::from(vec![None::<&str>]);

        assert_eq!(
            a.hash_row(0, &HASH_RANDOM_STATE),
            b.hash_row(0, &HASH_RANDOM_STATE)
        );
    }
}
