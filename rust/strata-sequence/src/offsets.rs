//! A collection of offsets for variable-length data.

use std::ops::Range;

use crate::values::Values;

/// A collection of offsets for variable-length data.
///
/// Stores a sequence of monotonically non-decreasing offsets, where each pair of
/// adjacent offsets defines the range of a single item. The first offset is
/// always present, so `N` items are described by `N + 1` offsets.
#[derive(Debug, Clone)]
pub struct Offsets(Values);

impl Offsets {
    /// Creates a collection with no items and a single offset at position 0.
    pub fn new() -> Offsets {
        Self::with_capacity(0)
    }

    /// Creates an empty collection with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Offsets {
        let mut buf = Values::with_capacity::<u64>(capacity + 1);
        buf.push(0u64);
        Offsets(buf)
    }

    /// Creates `len` zero-sized items.
    pub fn zeroed(len: usize) -> Offsets {
        Offsets(Values::zeroed::<u64>(len + 1))
    }

    /// Builds offsets from per-item lengths.
    pub fn from_lengths(lengths: impl IntoIterator<Item = u64>) -> Offsets {
        let mut offsets = Offsets::new();
        for len in lengths {
            offsets.push_length(len);
        }
        offsets
    }

    /// Returns the number of items, one less than the number of stored offsets.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.0.len::<u64>() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u64] {
        self.0.as_slice()
    }

    #[inline]
    pub fn first(&self) -> u64 {
        self.as_slice()[0]
    }

    #[inline]
    pub fn last(&self) -> u64 {
        self.as_slice()[self.item_count()]
    }

    /// Returns the total length of all items combined.
    #[inline]
    pub fn span(&self) -> u64 {
        self.last() - self.first()
    }

    /// Returns the range of the item at `index`.
    #[inline]
    pub fn range_at(&self, index: usize) -> Range<u64> {
        let offsets = self.as_slice();
        offsets[index]..offsets[index + 1]
    }

    /// Returns an iterator over the ranges of all items.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        self.as_slice().windows(2).map(|w| w[0]..w[1])
    }

    /// Appends an item of `len` elements.
    ///
    /// # Panics
    ///
    /// Panics if the end offset of the item overflows `u64`.
    #[inline]
    pub fn push_length(&mut self, len: u64) {
        assert!(self.try_push_length(len), "offset overflow");
    }

    /// Appends an item of `len` elements, returning `false` and leaving the
    /// offsets unchanged if its end offset would overflow `u64`.
    #[inline]
    pub fn try_push_length(&mut self, len: u64) -> bool {
        match self.last().checked_add(len) {
            Some(next_offset) => {
                self.0.push(next_offset);
                true
            }
            None => false,
        }
    }

    /// Appends an item ending at `next_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `next_offset` is less than the current last offset.
    #[inline]
    pub fn push_offset(&mut self, next_offset: u64) {
        assert!(next_offset >= self.last());
        self.0.push(next_offset);
    }

    /// Appends `count` zero-sized items.
    pub fn push_empty(&mut self, count: usize) {
        let last = self.last();
        self.0.resize(self.item_count() + 1 + count, last);
    }

    /// Consumes the collection and returns the underlying buffer of `u64` offsets.
    pub fn into_inner(self) -> Values {
        self.0
    }
}

impl Default for Offsets {
    fn default() -> Self {
        Self::new()
    }
}
