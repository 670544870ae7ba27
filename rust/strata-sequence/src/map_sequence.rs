//! A sequence representing `map` column data.

use strata_common::{Result, verify_arg};
use strata_format::schema::TypeKind;

use crate::{offsets::Offsets, presence::Presence, sequence::Sequence};

/// A sequence representing `map` column data.
///
/// Keys and values are stored flattened in two child sequences of equal
/// length, zipped positionally; offsets define the entries of each map.
pub struct MapSequence {
    /// Flattened keys.
    pub key: Option<Box<dyn Sequence>>,
    /// Flattened values.
    pub value: Option<Box<dyn Sequence>>,
    /// Offsets into the `key` and `value` sequences.
    pub offsets: Offsets,
    /// Presence of the map values.
    pub presence: Presence,
}

impl MapSequence {
    pub fn empty() -> MapSequence {
        MapSequence {
            key: None,
            value: None,
            offsets: Offsets::new(),
            presence: Presence::Trivial(0),
        }
    }

    /// Creates a new `MapSequence` with validation.
    ///
    /// Validates that:
    /// - The presence length equals the number of maps
    /// - The key and value sequences have the same length
    /// - The offsets stay within the bounds of the child sequences
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a check fails.
    pub fn try_new(
        key: Option<Box<dyn Sequence>>,
        value: Option<Box<dyn Sequence>>,
        offsets: Offsets,
        presence: Presence,
    ) -> Result<MapSequence> {
        verify_arg!(presence, presence.len() == offsets.item_count());
        let key_len = key.as_ref().map_or(0, |key| key.len());
        let value_len = value.as_ref().map_or(0, |value| value.len());
        verify_arg!(value, key_len == value_len);
        verify_arg!(offsets, offsets.last() as usize <= key_len);
        Ok(MapSequence {
            key,
            value,
            offsets,
            presence,
        })
    }

    /// Returns the entry range of the map at `index`.
    pub fn range_at(&self, index: usize) -> std::ops::Range<usize> {
        let range = self.offsets.range_at(index);
        range.start as usize..range.end as usize
    }
}

impl Clone for MapSequence {
    fn clone(&self) -> Self {
        Self {
            key: self.key.as_ref().map(|key| key.clone_boxed()),
            value: self.value.as_ref().map(|value| value.clone_boxed()),
            offsets: self.offsets.clone(),
            presence: self.presence.clone(),
        }
    }
}

impl Sequence for MapSequence {
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
        TypeKind::Map
    }

    fn len(&self) -> usize {
        self.presence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_sequence::ValueSequence;

    fn strings(values: &[&str]) -> Box<dyn Sequence> {
        let mut seq = ValueSequence::empty(TypeKind::String);
        values.iter().for_each(|v| seq.push_str(v));
        Box::new(seq)
    }

    #[test]
    fn test_keys_and_values_must_align() {
        let ok = MapSequence::try_new(
            Some(strings(&["a", "b"])),
            Some(strings(&["x", "y"])),
            Offsets::from_lengths([1, 1]),
            Presence::Trivial(2),
        )
        .unwrap();
        assert_eq!(ok.range_at(1), 1..2);
        assert_eq!(ok.kind(), TypeKind::Map);

        let err = MapSequence::try_new(
            Some(strings(&["a", "b"])),
            Some(strings(&["x"])),
            Offsets::from_lengths([1]),
            Presence::Trivial(1),
        );
        assert!(err.is_err());
    }
}
