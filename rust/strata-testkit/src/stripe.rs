//! In-memory stripe fixtures.
//!
//! [`StripeFixture`] collects column encodings and encoded streams keyed the
//! same way a stripe footer keys them. Integer streams are written with the
//! version 1 run-length encoding, so every column registered through the
//! typed helpers defaults to the `Direct` encoding.

use std::collections::BTreeMap;

use strata_format::stream::{ColumnEncoding, EncodingKey, StreamIdentifier, StreamKind};

use crate::rle::{encode_boolean_rle, encode_byte_rle, encode_int_rle_v1};

/// Fixed width of length streams written without varints.
const LENGTH_BYTE_WIDTH: usize = 4;

/// Bytes of one stream and whether its integers are varint packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamData {
    pub bytes: Vec<u8>,
    pub use_vints: bool,
}

/// Encodings and streams of a fixture stripe.
#[derive(Debug, Clone, Default)]
pub struct StripeParts {
    pub encodings: BTreeMap<EncodingKey, ColumnEncoding>,
    pub streams: BTreeMap<StreamIdentifier, StreamData>,
}

#[derive(Debug, Clone, Default)]
pub struct StripeFixture {
    parts: StripeParts,
}

impl StripeFixture {
    pub fn new() -> StripeFixture {
        Default::default()
    }

    /// Records the encoding of column instance `(node, sequence)`, replacing
    /// any earlier one.
    pub fn encoding(mut self, node: u32, sequence: u32, encoding: ColumnEncoding) -> Self {
        self.parts
            .encodings
            .insert(EncodingKey::new(node, sequence), encoding);
        self
    }

    /// Adds a stream with the given bytes without touching encodings.
    pub fn raw_stream(mut self, id: StreamIdentifier, bytes: Vec<u8>, use_vints: bool) -> Self {
        self.parts
            .streams
            .insert(id, StreamData { bytes, use_vints });
        self
    }

    pub fn present(self, node: u32, sequence: u32, present: &[bool]) -> Self {
        let id = StreamIdentifier::new(node, sequence, StreamKind::Present);
        self.raw_stream(id, encode_boolean_rle(present), false)
    }

    pub fn in_map(self, node: u32, sequence: u32, in_map: &[bool]) -> Self {
        let id = StreamIdentifier::new(node, sequence, StreamKind::InMap);
        self.raw_stream(id, encode_boolean_rle(in_map), false)
    }

    /// Adds a varint packed LENGTH stream and a `Direct` encoding unless one
    /// is already recorded.
    pub fn lengths(self, node: u32, sequence: u32, lengths: &[u64]) -> Self {
        self.lengths_with(node, sequence, lengths, true)
    }

    /// Like [`lengths`](Self::lengths), with explicit control over varint
    /// packing. Unpacked lengths are 4-byte little-endian integers.
    pub fn lengths_with(
        self,
        node: u32,
        sequence: u32,
        lengths: &[u64],
        use_vints: bool,
    ) -> Self {
        let values: Vec<i64> = lengths.iter().map(|&len| len as i64).collect();
        let bytes = encode_int_rle_v1(&values, false, use_vints, LENGTH_BYTE_WIDTH);
        let id = StreamIdentifier::new(node, sequence, StreamKind::Length);
        self.direct_if_absent(node, sequence)
            .raw_stream(id, bytes, use_vints)
    }

    /// Adds a signed integer DATA stream.
    pub fn int_data(self, node: u32, sequence: u32, values: &[i64]) -> Self {
        let bytes = encode_int_rle_v1(values, true, true, 8);
        let id = StreamIdentifier::new(node, sequence, StreamKind::Data);
        self.direct_if_absent(node, sequence)
            .raw_stream(id, bytes, true)
    }

    pub fn bool_data(self, node: u32, sequence: u32, values: &[bool]) -> Self {
        let id = StreamIdentifier::new(node, sequence, StreamKind::Data);
        self.direct_if_absent(node, sequence)
            .raw_stream(id, encode_boolean_rle(values), false)
    }

    pub fn byte_data(self, node: u32, sequence: u32, values: &[u8]) -> Self {
        let id = StreamIdentifier::new(node, sequence, StreamKind::Data);
        self.direct_if_absent(node, sequence)
            .raw_stream(id, encode_byte_rle(values), false)
    }

    /// Adds a DATA stream of little-endian doubles.
    pub fn double_data(self, node: u32, sequence: u32, values: &[f64]) -> Self {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let id = StreamIdentifier::new(node, sequence, StreamKind::Data);
        self.direct_if_absent(node, sequence)
            .raw_stream(id, bytes, false)
    }

    /// Adds the LENGTH and DATA streams of a directly encoded string column.
    pub fn string_data(self, node: u32, sequence: u32, values: &[&str]) -> Self {
        let lengths: Vec<u64> = values.iter().map(|v| v.len() as u64).collect();
        let bytes = values.iter().flat_map(|v| v.bytes()).collect();
        let id = StreamIdentifier::new(node, sequence, StreamKind::Data);
        self.lengths(node, sequence, &lengths)
            .raw_stream(id, bytes, false)
    }

    pub fn into_parts(self) -> StripeParts {
        self.parts
    }

    fn direct_if_absent(mut self, node: u32, sequence: u32) -> Self {
        self.parts
            .encodings
            .entry(EncodingKey::new(node, sequence))
            .or_insert_with(ColumnEncoding::direct);
        self
    }
}
