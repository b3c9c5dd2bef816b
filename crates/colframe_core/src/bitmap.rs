use std::fmt;

/// An LSB ordered bitmap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    len: usize,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn with_capacity(cap: usize) -> Self {
        Bitmap {
            len: 0,
            data: Vec::with_capacity(cap.div_ceil(8)),
        }
    }

    /// Create a new bitmap of a given length with all values initialized to the
    /// given value.
    pub fn new_with_val(val: bool, len: usize) -> Self {
        if val {
            Self::new_with_all_true(len)
        } else {
            Self::new_with_all_false(len)
        }
    }

    pub fn new_with_all_true(len: usize) -> Self {
        Bitmap {
            len,
            data: vec![u8::MAX; len.div_ceil(8)],
        }
    }

    pub fn new_with_all_false(len: usize) -> Self {
        Bitmap {
            len,
            data: vec![0; len.div_ceil(8)],
        }
    }

    /// Get the number of bits being tracked by this bitmap.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count_trues(&self) -> usize {
        let mut count = self
            .data
            .iter()
            .map(|&b| b.count_ones() as usize)
            .sum::<usize>();

        // Only count the bits that make up the "logical" portion of the
        // bitmap.
        let rem = self.len % 8;
        if rem != 0 {
            if let Some(last) = self.data.last() {
                count -= last.count_ones() as usize;
                let mask = (1u8 << rem) - 1;
                count += (mask & last).count_ones() as usize;
            }
        }

        count
    }

    pub fn is_all_true(&self) -> bool {
        self.count_trues() == self.len()
    }

    /// Push a value onto the end of the bitmap.
    pub fn push(&mut self, val: bool) {
        if self.len == self.data.len() * 8 {
            self.data.push(0);
        }
        let idx = self.len;
        self.len += 1;
        self.set(idx, val);
    }

    /// Get the value at index.
    ///
    /// Panics if index is out of bounds.
    #[inline]
    pub fn value(&self, idx: usize) -> bool {
        assert!(idx < self.len, "bitmap index {idx} out of bounds");
        let byte = self.data[idx >> 3]; // Equivalent to idx / 8
        (byte >> (idx & 7)) & 1 != 0 // `idx & 7` equivalent to `idx % 8`
    }

    /// Set a bit at index.
    ///
    /// Panics if index is out of bounds.
    #[inline]
    pub fn set(&mut self, idx: usize, val: bool) {
        assert!(idx < self.len, "bitmap index {idx} out of bounds");
        let byte = idx / 8;
        let bit = idx & 7;
        if val {
            self.data[byte] |= 1 << bit;
        } else {
            self.data[byte] &= !(1 << bit);
        }
    }

    /// Get an iterator over the bitmap.
    pub const fn iter(&self) -> BitmapIter<'_> {
        BitmapIter {
            idx: 0,
            bitmap: self,
        }
    }

    /// Get an iterator over the bitmap returning indexes of the bitmap where
    /// the bit is set to '1'.
    pub fn index_iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&idx| self.value(idx))
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<_> = self.iter().collect();
        f.debug_struct("Bitmap").field("values", &values).finish()
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut bitmap = Bitmap::with_capacity(iter.size_hint().0);
        bitmap.extend(iter);
        bitmap
    }
}

impl Extend<bool> for Bitmap {
    fn extend<T: IntoIterator<Item = bool>>(&mut self, iter: T) {
        for v in iter {
            self.push(v)
        }
    }
}

/// Iterator over individual bits (bools) in the bitmap.
#[derive(Debug)]
pub struct BitmapIter<'a> {
    idx: usize,
    bitmap: &'a Bitmap,
}

impl Iterator for BitmapIter<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.bitmap.len() {
            return None;
        }
        let v = self.bitmap.value(self.idx);
        self.idx += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bitmap.len() - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitmapIter<'_> {}
