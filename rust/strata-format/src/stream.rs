//! Stripe stream addressing and column encoding metadata.
//!
//! Every physical stream in a stripe is identified by the node id of the column
//! it belongs to, a *sequence* number and the stream kind. Sequence `0` denotes
//! the ordinary encoding of a column. Flat-map encoded maps store one physical
//! value column per distinct key; each of those instances shares the value
//! node's id and is told apart by a sequence number greater than zero.

use strata_common::{Result, error::Error};

/// Composite identity of one physical encoding instance of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodingKey {
    pub node: u32,
    pub sequence: u32,
}

impl EncodingKey {
    pub fn new(node: u32, sequence: u32) -> EncodingKey {
        EncodingKey { node, sequence }
    }

    /// Identifies the stream of the given kind belonging to this encoding instance.
    pub fn for_kind(&self, kind: StreamKind) -> StreamIdentifier {
        StreamIdentifier { key: *self, kind }
    }
}

impl std::fmt::Display for EncodingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.node, self.sequence)
    }
}

/// The physical aspect of a column encoding a stream holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    /// Presence bits (boolean RLE), absent when the column has no nulls.
    Present,
    /// Values.
    Data,
    /// Per-row lengths of repeated and variable-width columns.
    Length,
    /// Dictionary blob of dictionary encoded columns.
    DictionaryData,
    /// Secondary values, e.g. nanoseconds of timestamps.
    Secondary,
    /// Per-row "key is present in the map" bits of a flat-map value column.
    InMap,
}

/// Full identity of a stream within a stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamIdentifier {
    pub key: EncodingKey,
    pub kind: StreamKind,
}

impl StreamIdentifier {
    pub fn new(node: u32, sequence: u32, kind: StreamKind) -> StreamIdentifier {
        EncodingKey::new(node, sequence).for_kind(kind)
    }

    pub fn node(&self) -> u32 {
        self.key.node
    }

    pub fn sequence(&self) -> u32 {
        self.key.sequence
    }
}

impl std::fmt::Display for StreamIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:?}", self.key, self.kind)
    }
}

/// How a column instance is encoded within a stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnEncodingKind {
    Direct,
    Dictionary,
    DirectV2,
    DictionaryV2,
    /// A map stored as one physical value column per distinct key.
    MapFlat,
}

/// Version of the integer run-length encoding used by a column's streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RleVersion {
    V1,
    V2,
}

impl ColumnEncodingKind {
    /// Maps the encoding kind to the integer run-length encoding version of its streams.
    ///
    /// # Errors
    ///
    /// `MapFlat` columns do not carry integer streams of their own and yield
    /// `InvalidFormat`.
    pub fn rle_version(&self) -> Result<RleVersion> {
        match self {
            ColumnEncodingKind::Direct | ColumnEncodingKind::Dictionary => Ok(RleVersion::V1),
            ColumnEncodingKind::DirectV2 | ColumnEncodingKind::DictionaryV2 => Ok(RleVersion::V2),
            ColumnEncodingKind::MapFlat => Err(Error::invalid_format(format!(
                "no run-length version for {self:?} encoding"
            ))),
        }
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(
            self,
            ColumnEncodingKind::Dictionary | ColumnEncodingKind::DictionaryV2
        )
    }
}

/// Key of a flat-map value column instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlatMapKey {
    Int(i64),
    Bytes(Vec<u8>),
}

impl std::fmt::Display for FlatMapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlatMapKey::Int(key) => write!(f, "{key}"),
            FlatMapKey::Bytes(key) => f.write_str(&String::from_utf8_lossy(key)),
        }
    }
}

/// Encoding descriptor of one column instance, as recorded in the stripe footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEncoding {
    pub kind: ColumnEncodingKind,
    pub dictionary_size: u32,
    /// Set on flat-map value column instances (sequence > 0).
    pub key: Option<FlatMapKey>,
}

impl ColumnEncoding {
    pub fn new(kind: ColumnEncodingKind) -> ColumnEncoding {
        ColumnEncoding {
            kind,
            dictionary_size: 0,
            key: None,
        }
    }

    pub fn direct() -> ColumnEncoding {
        Self::new(ColumnEncodingKind::Direct)
    }

    pub fn with_key(mut self, key: FlatMapKey) -> ColumnEncoding {
        self.key = Some(key);
        self
    }

    pub fn with_dictionary_size(mut self, dictionary_size: u32) -> ColumnEncoding {
        self.dictionary_size = dictionary_size;
        self
    }
}
