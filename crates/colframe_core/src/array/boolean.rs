use std::cmp::Ordering;

use ahash::RandomState;

use super::{is_valid, normalize_validity};
use crate::bitmap::Bitmap;

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanArray {
    validity: Option<Bitmap>,
    values: Bitmap,
}

impl BooleanArray {
    pub fn new(values: Bitmap, validity: Option<Bitmap>) -> Self {
        if let Some(validity) = &validity {
            assert_eq!(values.len(), validity.len(), "validity length mismatch");
        }
        BooleanArray {
            validity: validity.and_then(normalize_validity),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    pub fn values(&self) -> &Bitmap {
        &self.values
    }

    pub fn is_valid(&self, idx: usize) -> bool {
        is_valid(self.validity.as_ref(), idx)
    }

    pub fn value(&self, idx: usize) -> Option<bool> {
        if self.is_valid(idx) {
            Some(self.values.value(idx))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<bool>> + '_ {
        (0..self.len()).map(|idx| self.value(idx))
    }

    /// Count the values that are both valid and true.
    pub fn true_count(&self) -> usize {
        match &self.validity {
            None => self.values.count_trues(),
            Some(validity) => validity
                .index_iter()
                .filter(|&idx| self.values.value(idx))
                .count(),
        }
    }

    pub(crate) fn cmp_valid(&self, idx: usize, other: &Self, other_idx: usize) -> Ordering {
        self.values.value(idx).cmp(&other.values.value(other_idx))
    }

    pub(crate) fn hash_valid(&self, idx: usize, state: &RandomState) -> u64 {
        state.hash_one(self.values.value(idx))
    }

    pub fn take_opt(&self, indices: &[Option<usize>]) -> Self {
        indices.iter().map(|idx| idx.and_then(|idx| self.value(idx))).collect()
    }

    pub fn interleave(arrays: &[&Self], indices: &[(usize, usize)]) -> Self {
        indices
            .iter()
            .map(|&(arr_idx, row_idx)| arrays[arr_idx].value(row_idx))
            .collect()
    }
}

impl FromIterator<Option<bool>> for BooleanArray {
    fn from_iter<T: IntoIterator<Item = Option<bool>>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();

        let mut validity = Bitmap::with_capacity(lower);
        let mut values = Bitmap::with_capacity(lower);

        for v in iter {
            values.push(v.unwrap_or(false));
            validity.push(v.is_some());
        }

        BooleanArray::new(values, Some(validity))
    }
}

impl FromIterator<bool> for BooleanArray {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        BooleanArray {
            validity: None,
            values: Bitmap::from_iter(iter),
        }
    }
}
