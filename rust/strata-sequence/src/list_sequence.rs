//! A sequence representing `list` column data.

use strata_common::{Result, verify_arg};
use strata_format::schema::TypeKind;

use crate::{offsets::Offsets, presence::Presence, sequence::Sequence};

/// A sequence representing `list` column data.
///
/// The elements of all lists are stored flattened in a single child sequence,
/// with offsets defining the boundaries of each list. Null lists own no
/// elements.
pub struct ListSequence {
    /// Flattened list of elements.
    pub item: Option<Box<dyn Sequence>>,
    /// Offsets into the `item` sequence.
    pub offsets: Offsets,
    /// Presence of the list values.
    pub presence: Presence,
}

impl ListSequence {
    pub fn empty() -> ListSequence {
        ListSequence {
            item: None,
            offsets: Offsets::new(),
            presence: Presence::Trivial(0),
        }
    }

    /// Creates a new `ListSequence` with validation.
    ///
    /// Validates that:
    /// - The presence length equals the number of lists
    /// - The offsets stay within the bounds of the child sequence
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a check fails.
    pub fn try_new(
        item: Option<Box<dyn Sequence>>,
        offsets: Offsets,
        presence: Presence,
    ) -> Result<ListSequence> {
        verify_arg!(presence, presence.len() == offsets.item_count());
        verify_arg!(
            offsets,
            offsets.last() as usize <= item.as_ref().map_or(0, |item| item.len())
        );
        Ok(ListSequence {
            item,
            offsets,
            presence,
        })
    }

    /// Returns the element range of the list at `index`.
    pub fn range_at(&self, index: usize) -> std::ops::Range<usize> {
        let range = self.offsets.range_at(index);
        range.start as usize..range.end as usize
    }
}

impl Clone for ListSequence {
    fn clone(&self) -> Self {
        Self {
            item: self.item.as_ref().map(|item| item.clone_boxed()),
            offsets: self.offsets.clone(),
            presence: self.presence.clone(),
        }
    }
}

impl Sequence for ListSequence {
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
        TypeKind::List
    }

    fn len(&self) -> usize {
        self.presence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_sequence::ValueSequence;

    fn ints(values: &[i64]) -> Box<dyn Sequence> {
        let mut seq = ValueSequence::empty(TypeKind::Long);
        values.iter().for_each(|&v| seq.push_value(v));
        Box::new(seq)
    }

    #[test]
    fn test_try_new_validates_shape() {
        let list = ListSequence::try_new(
            Some(ints(&[1, 2, 3])),
            Offsets::from_lengths([2, 0, 1]),
            Presence::from_flags(&[true, false, true]),
        )
        .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.range_at(2), 2..3);

        assert!(
            ListSequence::try_new(Some(ints(&[1])), Offsets::from_lengths([1]), Presence::Trivial(2))
                .is_err()
        );
        assert!(
            ListSequence::try_new(Some(ints(&[1])), Offsets::from_lengths([2]), Presence::Trivial(1))
                .is_err()
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let list = ListSequence::try_new(
            Some(ints(&[4, 5])),
            Offsets::from_lengths([2]),
            Presence::Trivial(1),
        )
        .unwrap();
        let copy = list.clone();
        let item = copy.item.as_deref().unwrap();
        let values = item.downcast_ref::<ValueSequence>().unwrap();
        assert_eq!(values.as_slice::<i64>(), &[4, 5]);
        assert_eq!(ListSequence::empty().len(), 0);
    }
}
