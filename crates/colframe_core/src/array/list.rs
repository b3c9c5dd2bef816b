use std::cmp::Ordering;
use std::ops::Range;

use ahash::RandomState;
use colframe_error::Result;

use super::{Array, is_valid, normalize_validity};
use crate::bitmap::Bitmap;
use crate::compute::hash::combine_hashes;
use crate::datatype::DataType;

/// Variable length lists stored as offsets into a single child array.
#[derive(Debug, Clone, PartialEq)]
pub struct ListArray {
    validity: Option<Bitmap>,
    /// Always `len + 1` entries.
    offsets: Vec<i64>,
    child: Box<Array>,
}

impl ListArray {
    /// Create a new list array.
    ///
    /// Panics if the offsets don't describe the child array.
    pub fn new(child: Array, offsets: Vec<i64>, validity: Option<Bitmap>) -> Self {
        assert!(!offsets.is_empty(), "list offsets must not be empty");
        assert_eq!(
            child.len() as i64,
            *offsets.last().unwrap_or(&0),
            "last offset must equal child length"
        );
        if let Some(validity) = &validity {
            assert_eq!(offsets.len() - 1, validity.len(), "validity length mismatch");
        }

        ListArray {
            validity: validity.and_then(normalize_validity),
            offsets,
            child: Box::new(child),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    pub fn is_valid(&self, idx: usize) -> bool {
        is_valid(self.validity.as_ref(), idx)
    }

    pub fn child(&self) -> &Array {
        &self.child
    }

    pub fn child_datatype(&self) -> DataType {
        self.child.datatype()
    }

    /// Range of child rows making up the list at `idx`. Null lists have an
    /// empty range.
    pub fn value_range(&self, idx: usize) -> Range<usize> {
        self.offsets[idx] as usize..self.offsets[idx + 1] as usize
    }

    /// Lexicographic comparison of two valid lists.
    pub(crate) fn cmp_valid(&self, idx: usize, other: &Self, other_idx: usize) -> Ordering {
        let left = self.value_range(idx);
        let right = other.value_range(other_idx);

        for (l, r) in left.clone().zip(right.clone()) {
            let ord = self.child.cmp_rows(l, &other.child, r);
            if ord != Ordering::Equal {
                return ord;
            }
        }

        left.len().cmp(&right.len())
    }

    pub(crate) fn hash_valid(&self, idx: usize, state: &RandomState) -> u64 {
        let range = self.value_range(idx);
        let init = state.hash_one(range.len());
        range.fold(init, |hash, row| {
            combine_hashes(hash, self.child.hash_row(row, state))
        })
    }

    pub fn take_opt(&self, indices: &[Option<usize>]) -> Self {
        let mut offsets = Vec::with_capacity(indices.len() + 1);
        offsets.push(0_i64);
        let mut validity = Bitmap::with_capacity(indices.len());
        let mut child_indices = Vec::new();

        for idx in indices {
            match idx {
                Some(idx) if self.is_valid(*idx) => {
                    child_indices.extend(self.value_range(*idx).map(Some));
                    validity.push(true);
                }
                _ => validity.push(false),
            }
            offsets.push(child_indices.len() as i64);
        }

        ListArray::new(self.child.take_opt(&child_indices), offsets, Some(validity))
    }

    pub fn interleave(arrays: &[&Self], indices: &[(usize, usize)]) -> Result<Self> {
        let children: Vec<_> = arrays.iter().map(|arr| arr.child()).collect();

        let mut offsets = Vec::with_capacity(indices.len() + 1);
        offsets.push(0_i64);
        let mut validity = Bitmap::with_capacity(indices.len());
        let mut child_indices = Vec::new();

        for &(arr_idx, row_idx) in indices {
            let arr = arrays[arr_idx];
            if arr.is_valid(row_idx) {
                child_indices.extend(
                    arr.value_range(row_idx)
                        .map(|child_row| (arr_idx, child_row)),
                );
                validity.push(true);
            } else {
                validity.push(false);
            }
            offsets.push(child_indices.len() as i64);
        }

        let child = Array::interleave(&children, &child_indices)?;

        Ok(ListArray::new(child, offsets, Some(validity)))
    }
}
