//! Row presence of a column: its PRESENT stream merged with an inherited
//! flat-map IN_MAP stream.

use strata_common::Result;
use strata_encodings::boolean_rle::BooleanRleDecoder;
use strata_format::stream::{EncodingKey, StreamKind};

use crate::read::params::ReadParams;

pub(crate) struct PresenceDecoder {
    in_map: Option<BooleanRleDecoder>,
    present: Option<BooleanRleDecoder>,
}

impl PresenceDecoder {
    /// Opens the optional PRESENT stream of column instance `key` and takes
    /// the in-map decoder out of `params`.
    pub fn new(key: EncodingKey, params: &mut ReadParams) -> Result<PresenceDecoder> {
        let present = params
            .stripe
            .get_stream(
                &key.for_kind(StreamKind::Present),
                params.labels.as_str(),
                false,
            )?
            .map(BooleanRleDecoder::new);
        Ok(PresenceDecoder {
            in_map: params.flat_map.in_map_decoder.take(),
            present,
        })
    }

    /// Decodes the presence of the next `rows` rows.
    ///
    /// Returns `None` when every row is present. Rows outside the map
    /// consume no PRESENT bit.
    pub fn read(&mut self, rows: usize) -> Result<Option<Vec<bool>>> {
        let in_map = match self.in_map.as_mut() {
            Some(in_map) => Some(in_map.next_vec(rows)?),
            None => None,
        };
        match self.present.as_mut() {
            Some(present) => {
                let mut flags = vec![false; rows];
                present.next(&mut flags, in_map.as_deref())?;
                Ok(Some(flags))
            }
            None => Ok(in_map),
        }
    }

    /// Consumes the presence of `rows` rows and returns how many were present.
    pub fn skip(&mut self, mut rows: u64) -> Result<u64> {
        if self.in_map.is_none() && self.present.is_none() {
            return Ok(rows);
        }
        let mut present = 0;
        while rows > 0 {
            let chunk = rows.min(SKIP_CHUNK_ROWS);
            let flags = self.read(chunk as usize)?;
            present += flags.map_or(chunk, |flags| count_set(&flags) as u64);
            rows -= chunk;
        }
        Ok(present)
    }
}

/// Largest number of rows decoded at once while skipping.
pub(crate) const SKIP_CHUNK_ROWS: u64 = 4096;

pub(crate) fn count_set(flags: &[bool]) -> usize {
    flags.iter().filter(|&&f| f).count()
}

#[cfg(test)]
mod tests {
    use strata_encodings::input_stream::InputStream;
    use strata_format::schema::{Type, TypeKind, TypeWithId};
    use strata_testkit::rle::encode_boolean_rle;

    use super::*;
    use crate::read::{
        column_selector::ColumnSelector,
        params::{FlatMapContext, StreamLabels},
        stripe_streams::InMemoryStripe,
    };

    fn stripe_with_present(present: Option<&[bool]>) -> InMemoryStripe {
        let root = TypeWithId::create(&Type::primitive(TypeKind::Int));
        let stripe = InMemoryStripe::new(4, ColumnSelector::all(&root));
        match present {
            Some(present) => stripe.with_stream(
                EncodingKey::new(0, 2).for_kind(StreamKind::Present),
                encode_boolean_rle(present),
                false,
            ),
            None => stripe,
        }
    }

    #[test]
    fn test_no_streams_means_all_present() {
        let stripe = stripe_with_present(None);
        let mut params = ReadParams::new(&stripe, StreamLabels::default());
        let mut presence = PresenceDecoder::new(EncodingKey::new(0, 2), &mut params).unwrap();
        assert_eq!(presence.read(3).unwrap(), None);
        assert_eq!(presence.skip(5).unwrap(), 5);
    }

    #[test]
    fn test_in_map_gates_present_bits() {
        let stripe = stripe_with_present(Some(&[true, false, true]));
        let in_map = BooleanRleDecoder::new(InputStream::new(
            encode_boolean_rle(&[true, false, true, true, false]),
            "in_map",
        ));
        let mut params = ReadParams::new(&stripe, StreamLabels::default()).with_flat_map(
            FlatMapContext {
                sequence: 2,
                in_map_decoder: Some(in_map),
                key_selection_callback: None,
            },
        );
        let mut presence = PresenceDecoder::new(EncodingKey::new(0, 2), &mut params).unwrap();
        assert!(params.flat_map.in_map_decoder.is_none());
        assert_eq!(
            presence.read(4).unwrap(),
            Some(vec![true, false, false, true])
        );
        assert_eq!(presence.skip(1).unwrap(), 0);
    }

    #[test]
    fn test_skip_past_the_stream_fails() {
        let stripe = stripe_with_present(Some(&[true, false, true]));
        let mut params = ReadParams::new(&stripe, StreamLabels::default());
        let mut presence = PresenceDecoder::new(EncodingKey::new(0, 2), &mut params).unwrap();
        assert!(presence.skip(1 << 62).is_err());
    }
}
