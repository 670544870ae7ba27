//! Selective decoding shared by list and map readers.
//!
//! For a batch of `n` container rows the length decoder is advanced by exactly
//! `n` positions, whether or not a row is included; null rows consume no
//! length. The lengths then determine which element rows the children must
//! produce: elements of excluded rows before the first and after the last
//! included element are skipped on the children, elements of excluded rows in
//! between are masked out of the child read.

use strata_common::{Result, error::Error, verify_arg, verify_data};
use strata_encodings::int_decoder::IntDecoder;
use strata_sequence::{offsets::Offsets, presence::Presence, sequence::Sequence};

use crate::read::{
    column_reader::ColumnReader,
    presence::{PresenceDecoder, SKIP_CHUNK_ROWS},
};

/// Container shape of one batch, restricted to the included rows.
pub(crate) struct RepeatedBatch {
    /// Offsets over the included rows.
    pub offsets: Offsets,
    /// Presence of the included rows.
    pub presence: Presence,
    /// Element rows to skip on the children before `span`.
    pub leading: u64,
    /// Element rows the children read, selected by `element_mask`.
    pub span: usize,
    /// Element rows to skip on the children after `span`.
    pub trailing: u64,
    /// Mask over `span`; `None` when every element in it is included.
    pub element_mask: Option<Vec<bool>>,
}

/// Length and presence cursors of a list or map column.
pub(crate) struct RepeatedShape {
    lengths: Box<dyn IntDecoder>,
    presence: PresenceDecoder,
}

impl RepeatedShape {
    pub fn new(lengths: Box<dyn IntDecoder>, presence: PresenceDecoder) -> RepeatedShape {
        RepeatedShape { lengths, presence }
    }

    /// Decodes presence and lengths of `rows` rows, along with the sum of the
    /// lengths.
    fn read_lengths(&mut self, rows: usize) -> Result<(Option<Vec<bool>>, Vec<u64>, u64)> {
        let flags = self.presence.read(rows)?;
        let mut raw = vec![0i64; rows];
        self.lengths.next(&mut raw, flags.as_deref())?;
        let mut lengths = Vec::with_capacity(rows);
        let mut total = 0u64;
        for len in raw {
            verify_data!(length, len >= 0);
            total = checked_total(total, len as u64)?;
            lengths.push(len as u64);
        }
        Ok((flags, lengths, total))
    }

    /// Decodes the shape of the next `rows` rows.
    ///
    /// `include`, when given, has one flag per row; only included rows are
    /// represented in the returned offsets and presence.
    pub fn read_batch(&mut self, rows: usize, include: Option<&[bool]>) -> Result<RepeatedBatch> {
        if let Some(include) = include {
            verify_arg!(include, include.len() == rows);
        }
        let (flags, lengths, total) = self.read_lengths(rows)?;
        let is_included = |row: usize| include.is_none_or(|include| include[row]);

        let mut offsets = Offsets::with_capacity(rows);
        let mut present = Vec::with_capacity(rows);
        for row in (0..rows).filter(|&row| is_included(row)) {
            verify_data!(length, offsets.try_push_length(lengths[row]));
            present.push(flags.as_ref().is_none_or(|flags| flags[row]));
        }

        let first = (0..rows).find(|&row| is_included(row) && lengths[row] > 0);
        let Some(first) = first else {
            return Ok(RepeatedBatch {
                offsets,
                presence: Presence::from_flags(&present),
                leading: total,
                span: 0,
                trailing: 0,
                element_mask: None,
            });
        };
        let last = (first..rows)
            .rev()
            .find(|&row| is_included(row) && lengths[row] > 0)
            .unwrap_or(first);

        let leading: u64 = lengths[..first].iter().sum();
        let span: u64 = lengths[first..=last].iter().sum();
        let element_mask = (first..=last).any(|row| !is_included(row)).then(|| {
            (first..=last)
                .flat_map(|row| std::iter::repeat_n(is_included(row), lengths[row] as usize))
                .collect()
        });

        Ok(RepeatedBatch {
            offsets,
            presence: Presence::from_flags(&present),
            leading,
            span: span as usize,
            trailing: total - leading - span,
            element_mask,
        })
    }

    /// Consumes `rows` rows and returns the number of elements they own.
    pub fn skip(&mut self, mut rows: u64) -> Result<u64> {
        let mut elements = 0u64;
        while rows > 0 {
            let chunk = rows.min(SKIP_CHUNK_ROWS);
            let (_, _, total) = self.read_lengths(chunk as usize)?;
            elements = checked_total(elements, total)?;
            rows -= chunk;
        }
        Ok(elements)
    }
}

impl RepeatedBatch {
    /// Reads the batch's elements from `child`: skips the leading elements,
    /// reads the masked span and skips the trailing elements.
    pub fn read_child(&self, child: &mut ColumnReader) -> Result<Box<dyn Sequence>> {
        child.skip(self.leading)?;
        let elements = child.read(self.span, self.element_mask.as_deref())?;
        child.skip(self.trailing)?;
        Ok(elements)
    }
}

/// Adds `len` to a running element count, which must stay within `i64`.
fn checked_total(total: u64, len: u64) -> Result<u64> {
    total
        .checked_add(len)
        .filter(|&sum| sum <= i64::MAX as u64)
        .ok_or_else(|| {
            Error::invalid_format(format!("element count overflows after {total} elements"))
        })
}

#[cfg(test)]
mod tests {
    use strata_common::error::ErrorKind;
    use strata_encodings::{
        input_stream::InputStream,
        int_decoder::{INT_BYTE_SIZE, create_rle_decoder},
    };
    use strata_format::{
        schema::{Type, TypeKind, TypeWithId},
        stream::{EncodingKey, RleVersion},
    };
    use strata_testkit::rle::encode_int_rle_v1;

    use super::*;
    use crate::read::{
        column_selector::ColumnSelector,
        params::{ReadParams, StreamLabels},
        stripe_streams::InMemoryStripe,
    };

    fn shape(lengths: &[i64]) -> RepeatedShape {
        let root = TypeWithId::create(&Type::list(Type::primitive(TypeKind::Int)));
        let stripe = InMemoryStripe::new(lengths.len() as u64, ColumnSelector::all(&root));
        let mut params = ReadParams::new(&stripe, StreamLabels::default());
        let presence = PresenceDecoder::new(EncodingKey::new(0, 0), &mut params).unwrap();
        let bytes = encode_int_rle_v1(lengths, false, true, INT_BYTE_SIZE);
        let decoder = create_rle_decoder::<false>(
            RleVersion::V1,
            InputStream::new(bytes, "len"),
            true,
            INT_BYTE_SIZE,
        )
        .unwrap();
        RepeatedShape::new(decoder, presence)
    }

    #[test]
    fn test_all_rows_included() {
        let batch = shape(&[2, 0, 3]).read_batch(3, None).unwrap();
        assert_eq!(batch.offsets.as_slice(), &[0, 2, 2, 5]);
        assert_eq!((batch.leading, batch.span, batch.trailing), (0, 5, 0));
        assert!(batch.element_mask.is_none());
        assert_eq!(batch.presence.len(), 3);
    }

    #[test]
    fn test_excluded_rows_still_consume_lengths() {
        let mut shape = shape(&[1, 2, 3, 4, 5]);
        let batch = shape
            .read_batch(4, Some(&[false, true, false, true]))
            .unwrap();
        assert_eq!(batch.offsets.as_slice(), &[0, 2, 6]);
        assert_eq!((batch.leading, batch.span, batch.trailing), (1, 9, 0));
        let mask = batch.element_mask.unwrap();
        assert_eq!(mask.len(), 9);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 6);
        assert!(mask[..2].iter().all(|&m| m));
        assert!(mask[2..5].iter().all(|&m| !m));

        // the fifth length is next
        assert_eq!(shape.skip(1).unwrap(), 5);
    }

    #[test]
    fn test_trailing_elements_and_empty_selection() {
        let batch = shape(&[3, 0, 2])
            .read_batch(3, Some(&[true, true, false]))
            .unwrap();
        assert_eq!(batch.offsets.as_slice(), &[0, 3, 3]);
        assert_eq!((batch.leading, batch.span, batch.trailing), (0, 3, 2));

        let batch = shape(&[3, 1])
            .read_batch(2, Some(&[false, false]))
            .unwrap();
        assert!(batch.offsets.is_empty());
        assert_eq!((batch.leading, batch.span, batch.trailing), (4, 0, 0));
    }

    #[test]
    fn test_overflowing_lengths_are_rejected() {
        let err = shape(&[i64::MAX, i64::MAX, i64::MAX])
            .read_batch(3, None)
            .err()
            .unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));

        let err = shape(&[i64::MAX, 2]).skip(2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }

    #[test]
    fn test_skip_spans_several_chunks() {
        let rows = SKIP_CHUNK_ROWS as usize * 2 + 3;
        let mut shape = shape(&vec![2; rows + 1]);
        assert_eq!(shape.skip(rows as u64).unwrap(), 2 * rows as u64);
        assert_eq!(shape.skip(1).unwrap(), 2);
        assert!(shape.skip(1).is_err());
    }

    #[test]
    fn test_include_length_is_checked() {
        assert!(shape(&[1, 1]).read_batch(2, Some(&[true])).is_err());
    }
}
