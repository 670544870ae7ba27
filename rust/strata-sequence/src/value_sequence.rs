//! A basic sequence of primitive values.

use bytemuck::Pod;
use strata_format::schema::TypeKind;

use crate::{offsets::Offsets, presence::Presence, sequence::Sequence, values::Values};

/// A sequence of primitive values with optional offsets and presence information.
///
/// Fixed-width kinds store one value per slot in `values`, null slots included
/// (zero-filled): booleans as `u8`, `tinyint` as `i8`, `smallint` as `i16`,
/// `int` as `i32`, `bigint` and `timestamp` as `i64`, `float` as `f32` and
/// `double` as `f64`.
///
/// `string` and `binary` values are stored as one concatenated byte buffer in
/// `values`, accompanied by `offsets`; the value at index `i` occupies the byte
/// range `offsets[i]..offsets[i + 1]`. Null slots are empty.
#[derive(Debug, Clone)]
pub struct ValueSequence {
    pub values: Values,
    pub offsets: Option<Offsets>,
    pub presence: Presence,
    pub kind: TypeKind,
}

fn requires_offsets(kind: TypeKind) -> bool {
    matches!(kind, TypeKind::String | TypeKind::Binary)
}

impl ValueSequence {
    /// Creates an empty sequence of the given primitive kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a container kind.
    pub fn empty(kind: TypeKind) -> ValueSequence {
        Self::with_capacity(kind, 0)
    }

    pub fn with_capacity(kind: TypeKind, capacity: usize) -> ValueSequence {
        assert!(!kind.is_container(), "{kind} values are not stored in a value sequence");
        let width = kind.fixed_width().unwrap_or(0);
        ValueSequence {
            values: Values::with_capacity::<u8>(capacity * width),
            offsets: requires_offsets(kind).then(|| Offsets::with_capacity(capacity)),
            presence: Presence::Trivial(0),
            kind,
        }
    }

    /// Creates a sequence of `len` nulls.
    pub fn nulls(kind: TypeKind, len: usize) -> ValueSequence {
        let mut seq = Self::with_capacity(kind, len);
        seq.push_nulls(len);
        seq
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.presence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a fixed-width value.
    ///
    /// # Panics
    ///
    /// Panics if the size of `T` differs from the width of the sequence's kind.
    pub fn push_value<T: Pod>(&mut self, value: T) {
        assert_eq!(self.kind.fixed_width(), Some(std::mem::size_of::<T>()));
        self.values.push(value);
        self.presence.push_non_null();
    }

    /// Appends a `string` or `binary` value.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is not of a variable-length kind.
    pub fn push_binary(&mut self, value: &[u8]) {
        let Some(offsets) = self.offsets.as_mut() else {
            panic!("{} sequence does not hold variable-length values", self.kind);
        };
        offsets.push_length(value.len() as u64);
        self.values.extend_from_bytes(value);
        self.presence.push_non_null();
    }

    pub fn push_str(&mut self, value: &str) {
        self.push_binary(value.as_bytes());
    }

    pub fn push_null(&mut self) {
        self.push_nulls(1);
    }

    pub fn push_nulls(&mut self, count: usize) {
        match self.offsets.as_mut() {
            Some(offsets) => offsets.push_empty(count),
            None => {
                let width = self.kind.fixed_width().unwrap_or(0);
                let len = self.values.bytes_len();
                self.values.resize::<u8>(len + count * width, 0);
            }
        }
        self.presence.extend_with_nulls(count);
    }

    /// Views the fixed-width values, null slots included.
    pub fn as_slice<T: Pod>(&self) -> &[T] {
        self.values.as_slice()
    }

    /// Returns the bytes of the variable-length value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is not of a variable-length kind or `index` is
    /// out of bounds.
    pub fn binary_at(&self, index: usize) -> &[u8] {
        let Some(offsets) = self.offsets.as_ref() else {
            panic!("{} sequence does not hold variable-length values", self.kind);
        };
        let range = offsets.range_at(index);
        &self.values.as_bytes()[range.start as usize..range.end as usize]
    }

    /// Returns the string at `index`, or `None` if it is null or not valid UTF-8.
    pub fn string_at(&self, index: usize) -> Option<&str> {
        if self.presence.is_null(index) {
            return None;
        }
        std::str::from_utf8(self.binary_at(index)).ok()
    }

    /// Returns the value at `index` of an integer, boolean or timestamp
    /// sequence, or `None` if it is null or the kind is not integral.
    pub fn integer_at(&self, index: usize) -> Option<i64> {
        if self.presence.is_null(index) {
            return None;
        }
        let value = match self.kind {
            TypeKind::Boolean => i64::from(self.as_slice::<u8>()[index]),
            TypeKind::Byte => i64::from(self.as_slice::<i8>()[index]),
            TypeKind::Short => i64::from(self.as_slice::<i16>()[index]),
            TypeKind::Int => i64::from(self.as_slice::<i32>()[index]),
            TypeKind::Long | TypeKind::Timestamp => self.as_slice::<i64>()[index],
            _ => return None,
        };
        Some(value)
    }

    /// Returns the value at `index` of a `float` or `double` sequence.
    pub fn float_at(&self, index: usize) -> Option<f64> {
        if self.presence.is_null(index) {
            return None;
        }
        match self.kind {
            TypeKind::Float => Some(f64::from(self.as_slice::<f32>()[index])),
            TypeKind::Double => Some(self.as_slice::<f64>()[index]),
            _ => None,
        }
    }

    /// Builds a new sequence keeping only the slots whose `mask` flag is set.
    ///
    /// # Panics
    ///
    /// Panics if `mask` is shorter than the sequence.
    pub fn select(&self, mask: &[bool]) -> ValueSequence {
        assert!(mask.len() >= self.len());
        let kept = mask[..self.len()].iter().filter(|&&m| m).count();
        let mut out = ValueSequence::with_capacity(self.kind, kept);
        let width = self.kind.fixed_width().unwrap_or(0);
        for (index, _) in mask[..self.len()].iter().enumerate().filter(|(_, m)| **m) {
            if self.presence.is_null(index) {
                out.push_null();
            } else if self.offsets.is_some() {
                out.push_binary(self.binary_at(index));
            } else {
                out.values
                    .extend_from_bytes(&self.values.as_bytes()[index * width..(index + 1) * width]);
                out.presence.push_non_null();
            }
        }
        out
    }
}

impl Sequence for ValueSequence {
    fn as_any(&self) -> &(dyn std::any::Any + Send + Sync + 'static) {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any + Send + Sync + 'static> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Sequence> {
        Box::new(self.clone())
    }

    fn kind(&self) -> TypeKind {
        self.kind
    }

    fn len(&self) -> usize {
        self.presence.len()
    }
}
