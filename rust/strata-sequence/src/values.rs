//! A collection of values stored as bytes with alignment guarantees.

use bytemuck::Pod;

const WORD: usize = std::mem::size_of::<u64>();

/// A collection of values stored as bytes with alignment guarantees.
///
/// The bytes are kept in a buffer of 64-bit words, so the content can be
/// viewed as a slice of any plain-old-data type with an alignment of up to
/// eight bytes.
#[derive(Debug, Clone, Default)]
pub struct Values {
    words: Vec<u64>,
    len: usize,
}

impl Values {
    /// Creates a new, empty `Values` instance.
    pub fn new() -> Values {
        Values::default()
    }

    /// Creates an empty instance with room for `capacity` elements of type `T`.
    pub fn with_capacity<T>(capacity: usize) -> Values {
        let bytes = capacity * std::mem::size_of::<T>();
        Values {
            words: Vec::with_capacity(bytes.div_ceil(WORD)),
            len: 0,
        }
    }

    /// Creates an instance holding `len` zeroed elements of type `T`.
    pub fn zeroed<T>(len: usize) -> Values {
        let bytes = len * std::mem::size_of::<T>();
        Values {
            words: vec![0; bytes.div_ceil(WORD)],
            len: bytes,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of complete elements of type `T` in the container.
    #[inline]
    pub fn len<T>(&self) -> usize {
        self.len / std::mem::size_of::<T>()
    }

    #[inline]
    pub fn bytes_len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len]
    }

    /// Interprets the content as a slice of `T`, ignoring trailing bytes that
    /// do not form a complete element.
    #[inline]
    pub fn as_slice<T: Pod>(&self) -> &[T] {
        let size = std::mem::size_of::<T>();
        let whole = self.len - self.len % size;
        bytemuck::cast_slice(&bytemuck::cast_slice::<u64, u8>(&self.words)[..whole])
    }

    #[inline]
    pub fn as_mut_slice<T: Pod>(&mut self) -> &mut [T] {
        let size = std::mem::size_of::<T>();
        let whole = self.len - self.len % size;
        bytemuck::cast_slice_mut(&mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..whole])
    }

    #[inline]
    pub fn push<T: Pod>(&mut self, value: T) {
        self.extend_from_slice(std::slice::from_ref(&value));
    }

    pub fn extend_from_slice<T: Pod>(&mut self, values: &[T]) {
        self.extend_from_bytes(bytemuck::cast_slice(values));
    }

    pub fn extend_from_bytes(&mut self, bytes: &[u8]) {
        let start = self.len;
        let end = start + bytes.len();
        self.words.resize(end.div_ceil(WORD), 0);
        bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[start..end].copy_from_slice(bytes);
        self.len = end;
    }

    /// Resizes the container to exactly `new_len` elements of type `T`,
    /// filling added slots with `value`.
    pub fn resize<T: Pod>(&mut self, new_len: usize, value: T) {
        let current = self.len::<T>();
        if new_len <= current {
            self.truncate_bytes(new_len * std::mem::size_of::<T>());
        } else {
            let fill = vec![value; new_len - current];
            self.extend_from_slice(&fill);
        }
    }

    pub fn clear(&mut self) {
        self.truncate_bytes(0);
    }

    fn truncate_bytes(&mut self, len: usize) {
        // zero the tail of the last kept word so later appends start clean
        let bytes = bytemuck::cast_slice_mut::<u64, u8>(&mut self.words);
        bytes[len..].fill(0);
        self.words.truncate(len.div_ceil(WORD));
        self.len = len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_view() {
        let mut values = Values::new();
        values.push(1u32);
        values.push(2u32);
        values.push(3u32);
        assert_eq!(values.as_slice::<u32>(), &[1, 2, 3]);
        assert_eq!(values.bytes_len(), 12);
        assert_eq!(&values.as_bytes()[..4], &[1, 0, 0, 0]);
        assert_eq!(values.len::<u64>(), 1);
    }

    #[test]
    fn test_zeroed_and_resize() {
        let mut values = Values::zeroed::<i16>(3);
        assert_eq!(values.as_slice::<i16>(), &[0, 0, 0]);
        values.resize(5, -1i16);
        assert_eq!(values.as_slice::<i16>(), &[0, 0, 0, -1, -1]);
        values.resize(2, 0i16);
        assert_eq!(values.as_slice::<i16>(), &[0, 0]);
        values.push(7i16);
        assert_eq!(values.as_slice::<i16>(), &[0, 0, 7]);
    }

    #[test]
    fn test_mixed_width_bytes() {
        let mut values = Values::new();
        values.extend_from_bytes(b"hello");
        values.extend_from_bytes(b", world");
        assert_eq!(values.as_bytes(), b"hello, world");
        values.clear();
        assert!(values.is_empty());
        values.extend_from_slice(&[1.5f64]);
        assert_eq!(values.as_slice::<f64>(), &[1.5]);
    }

    #[test]
    fn test_mutable_view() {
        let mut values = Values::zeroed::<u64>(2);
        values.as_mut_slice::<u64>()[1] = 9;
        assert_eq!(values.as_slice::<u64>(), &[0, 9]);
    }
}
