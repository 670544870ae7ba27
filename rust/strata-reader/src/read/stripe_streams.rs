//! Access to the encodings and streams of one stripe.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, PoisonError},
};

use strata_common::{Result, error::Error};
use strata_encodings::input_stream::InputStream;
use strata_format::stream::{ColumnEncoding, EncodingKey, StreamIdentifier};

use crate::read::column_selector::ColumnSelector;

/// The stream source of an opened stripe.
///
/// Stripe content is immutable once opened, so every lookup is repeatable.
/// Implementations record the streams handed out for I/O accounting.
pub trait StripeStreams: Send + Sync {
    /// Number of rows in the stripe.
    fn row_count(&self) -> u64;

    /// Returns the encoding descriptor of a column instance.
    ///
    /// # Errors
    ///
    /// Returns `MissingResource` if the stripe has no descriptor for `key`.
    fn get_encoding(&self, key: EncodingKey) -> Result<ColumnEncoding>;

    /// Whether the integers of the stream are packed as varints.
    fn use_vints(&self, id: &StreamIdentifier) -> bool;

    /// Opens a stream labeled `label`.
    ///
    /// Returns `Ok(None)` for an absent optional stream.
    ///
    /// # Errors
    ///
    /// Returns `MissingResource` if a `required` stream is absent.
    fn get_stream(
        &self,
        id: &StreamIdentifier,
        label: &str,
        required: bool,
    ) -> Result<Option<InputStream>>;

    fn column_selector(&self) -> &ColumnSelector;

    /// Lists the `(sequence, encoding)` pairs of every encoding instance of
    /// `node` with a sequence greater than zero, in sequence order.
    fn sequences_of(&self, node: u32) -> Vec<(u32, ColumnEncoding)>;

    /// Streams handed out so far, in identifier order.
    fn streams_in_use(&self) -> Vec<StreamIdentifier>;
}

struct StoredStream {
    data: Arc<[u8]>,
    use_vints: bool,
}

/// A stripe whose streams are held in memory, already decompressed.
pub struct InMemoryStripe {
    row_count: u64,
    selector: ColumnSelector,
    encodings: BTreeMap<EncodingKey, ColumnEncoding>,
    streams: BTreeMap<StreamIdentifier, StoredStream>,
    in_use: Mutex<BTreeSet<StreamIdentifier>>,
}

impl InMemoryStripe {
    pub fn new(row_count: u64, selector: ColumnSelector) -> InMemoryStripe {
        InMemoryStripe {
            row_count,
            selector,
            encodings: BTreeMap::new(),
            streams: BTreeMap::new(),
            in_use: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn with_encoding(mut self, key: EncodingKey, encoding: ColumnEncoding) -> Self {
        self.encodings.insert(key, encoding);
        self
    }

    pub fn with_stream(
        mut self,
        id: StreamIdentifier,
        data: impl Into<Arc<[u8]>>,
        use_vints: bool,
    ) -> Self {
        self.streams.insert(
            id,
            StoredStream {
                data: data.into(),
                use_vints,
            },
        );
        self
    }
}

impl StripeStreams for InMemoryStripe {
    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn get_encoding(&self, key: EncodingKey) -> Result<ColumnEncoding> {
        self.encodings.get(&key).cloned().ok_or_else(|| {
            Error::missing_resource(
                format!("encoding {key}"),
                "the stripe has no encoding descriptor for the column",
            )
        })
    }

    fn use_vints(&self, id: &StreamIdentifier) -> bool {
        self.streams.get(id).is_none_or(|stream| stream.use_vints)
    }

    fn get_stream(
        &self,
        id: &StreamIdentifier,
        label: &str,
        required: bool,
    ) -> Result<Option<InputStream>> {
        let Some(stream) = self.streams.get(id) else {
            if required {
                return Err(Error::missing_resource(
                    format!("stream {id}"),
                    format!("required by '{label}'"),
                ));
            }
            return Ok(None);
        };
        log::trace!("stream {id} in use by '{label}'");
        self.in_use
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*id);
        Ok(Some(InputStream::new(stream.data.clone(), label)))
    }

    fn column_selector(&self) -> &ColumnSelector {
        &self.selector
    }

    fn sequences_of(&self, node: u32) -> Vec<(u32, ColumnEncoding)> {
        self.encodings
            .range(EncodingKey::new(node, 1)..=EncodingKey::new(node, u32::MAX))
            .map(|(key, encoding)| (key.sequence, encoding.clone()))
            .collect()
    }

    fn streams_in_use(&self) -> Vec<StreamIdentifier> {
        self.in_use
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }
}
