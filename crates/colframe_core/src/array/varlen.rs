use std::cmp::Ordering;

use ahash::RandomState;

use super::{is_valid, normalize_validity};
use crate::bitmap::Bitmap;

/// Array of utf8 strings with 64-bit offsets into a single data buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Utf8Array {
    validity: Option<Bitmap>,
    /// Always `len + 1` entries.
    offsets: Vec<i64>,
    data: String,
}

impl Utf8Array {
    pub fn with_capacity(cap: usize) -> Self {
        let mut offsets = Vec::with_capacity(cap + 1);
        offsets.push(0);
        Utf8Array {
            validity: None,
            offsets,
            data: String::new(),
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

    pub fn value(&self, idx: usize) -> Option<&str> {
        if !self.is_valid(idx) {
            return None;
        }
        Some(self.raw_value(idx))
    }

    /// Get the string at `idx` ignoring validity. Null slots are empty.
    fn raw_value(&self, idx: usize) -> &str {
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        &self.data[start..end]
    }

    pub(crate) fn cmp_valid(&self, idx: usize, other: &Self, other_idx: usize) -> Ordering {
        self.raw_value(idx).cmp(other.raw_value(other_idx))
    }

    pub(crate) fn hash_valid(&self, idx: usize, state: &RandomState) -> u64 {
        state.hash_one(self.raw_value(idx))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<&str>> + '_ {
        (0..self.len()).map(|idx| self.value(idx))
    }

    fn push(&mut self, value: Option<&str>, validity: &mut Bitmap) {
        if let Some(value) = value {
            self.data.push_str(value);
        }
        self.offsets.push(self.data.len() as i64);
        validity.push(value.is_some());
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

impl<S: AsRef<str>> FromIterator<Option<S>> for Utf8Array {
    fn from_iter<T: IntoIterator<Item = Option<S>>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();

        let mut arr = Utf8Array::with_capacity(lower);
        let mut validity = Bitmap::with_capacity(lower);
        for v in iter {
            arr.push(v.as_ref().map(|s| s.as_ref()), &mut validity);
        }
        arr.validity = normalize_validity(validity);

        arr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_with_nulls() {
        let arr = Utf8Array::from_iter([Some("hello"), None, Some(""), Some("world")]);
        assert_eq!(4, arr.len());
        assert_eq!(
            vec![Some("hello"), None, Some(""), Some("world")],
            arr.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn take_repeats() {
        let arr = Utf8Array::from_iter([Some("a"), Some("bb"), Some("ccc")]);
        let got = arr.take_opt(&[Some(2), Some(2), None, Some(0)]);
        assert_eq!(
            vec![Some("ccc"), Some("ccc"), None, Some("a")],
            got.iter().collect::<Vec<_>>()
        );
    }
}
