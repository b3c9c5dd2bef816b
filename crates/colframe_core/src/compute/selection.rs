use std::ops::Range;

use colframe_error::{Result, shape_err};

use crate::array::{Array, BooleanArray};

/// Row positions selected by a mask. Null mask entries select nothing.
pub fn mask_indices(mask: &BooleanArray) -> Vec<usize> {
    (0..mask.len())
        .filter(|&idx| mask.value(idx).unwrap_or(false))
        .collect()
}

pub fn check_mask_len(mask_len: usize, len: usize) -> Result<()> {
    if mask_len != len {
        return Err(shape_err!(
            "Boolean mask length {mask_len} does not match length {len}"
        ));
    }
    Ok(())
}

pub fn check_indices(indices: &[usize], len: usize) -> Result<()> {
    if let Some(idx) = indices.iter().find(|&&idx| idx >= len) {
        return Err(shape_err!("Index {idx} out of range for length {len}"));
    }
    Ok(())
}

/// Keep the rows where the mask is true.
pub fn filter(array: &Array, mask: &BooleanArray) -> Result<Array> {
    check_mask_len(mask.len(), array.len())?;
    Ok(array.take(&mask_indices(mask)))
}

/// Gather rows by position, erroring on out of range positions.
pub fn take(array: &Array, indices: &[usize]) -> Result<Array> {
    check_indices(indices, array.len())?;
    Ok(array.take(indices))
}

/// Compute the rows covered by a slice, clipped to `[0, len]`.
pub fn slice_bounds(len: usize, offset: usize, length: usize) -> Range<usize> {
    let start = offset.min(len);
    let end = start.saturating_add(length).min(len);
    start..end
}

pub fn slice(array: &Array, offset: usize, length: usize) -> Array {
    let indices: Vec<_> = slice_bounds(array.len(), offset, length).collect();
    array.take(&indices)
}
