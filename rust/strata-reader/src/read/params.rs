//! Addressing context handed down the reader tree during construction.

use std::sync::Arc;

use strata_encodings::boolean_rle::BooleanRleDecoder;
use strata_format::stream::EncodingKey;

use crate::read::stripe_streams::StripeStreams;

/// Key selection outcome of one flat-map column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySelectionStats {
    /// File node id of the flat-map column.
    pub node: u32,
    /// Number of distinct keys stored in the stripe.
    pub total_keys: usize,
    /// Number of keys that passed the key filter.
    pub selected_keys: usize,
}

pub type KeySelectionCallback = Arc<dyn Fn(&KeySelectionStats) + Send + Sync>;

/// Flat-map scoping of a reader.
///
/// `sequence` is inherited from the nearest flat-map ancestor (0 outside any
/// flat map). The in-map decoder is only set for the value readers of a flat
/// map. The key selection callback reaches struct fields but never the
/// children of a list, map or flat map.
#[derive(Default)]
pub struct FlatMapContext {
    pub sequence: u32,
    pub in_map_decoder: Option<BooleanRleDecoder>,
    pub key_selection_callback: Option<KeySelectionCallback>,
}

impl FlatMapContext {
    /// Context of a list element or a map key or value: same sequence,
    /// nothing else.
    pub fn for_child(&self) -> FlatMapContext {
        FlatMapContext {
            sequence: self.sequence,
            in_map_decoder: None,
            key_selection_callback: None,
        }
    }

    /// Context of a struct field: same sequence and callback, no in-map decoder.
    pub fn for_field(&self) -> FlatMapContext {
        FlatMapContext {
            key_selection_callback: self.key_selection_callback.clone(),
            ..self.for_child()
        }
    }
}

impl std::fmt::Debug for FlatMapContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatMapContext")
            .field("sequence", &self.sequence)
            .field("in_map_decoder", &self.in_map_decoder.is_some())
            .field(
                "key_selection_callback",
                &self.key_selection_callback.is_some(),
            )
            .finish()
    }
}

/// Hierarchical stream label of a column, e.g. `/user/attrs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLabels {
    path: Arc<str>,
}

impl StreamLabels {
    pub fn new(root: &str) -> StreamLabels {
        StreamLabels { path: root.into() }
    }

    /// Label of a named child column.
    pub fn append(&self, name: &str) -> StreamLabels {
        let path = if self.path.ends_with('/') {
            format!("{}{name}", self.path)
        } else {
            format!("{}/{name}", self.path)
        };
        StreamLabels { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl Default for StreamLabels {
    fn default() -> Self {
        StreamLabels::new("/")
    }
}

/// Everything a reader constructor needs besides the type pair and its
/// projection node.
///
/// The stripe is borrowed for the duration of construction only; readers
/// keep the streams they open, never the stripe.
pub struct ReadParams<'a> {
    pub stripe: &'a dyn StripeStreams,
    pub labels: StreamLabels,
    pub flat_map: FlatMapContext,
}

impl<'a> ReadParams<'a> {
    pub fn new(stripe: &'a dyn StripeStreams, labels: StreamLabels) -> ReadParams<'a> {
        ReadParams {
            stripe,
            labels,
            flat_map: FlatMapContext::default(),
        }
    }

    pub fn with_flat_map(mut self, flat_map: FlatMapContext) -> Self {
        self.flat_map = flat_map;
        self
    }

    /// Encoding key of the column instance `node` under the current sequence.
    pub fn encoding_key(&self, node: u32) -> EncodingKey {
        EncodingKey::new(node, self.flat_map.sequence)
    }

    /// Parameters for a child of a list or map: same stripe and sequence, no
    /// in-map decoder, no callback.
    pub fn for_child(&self, labels: StreamLabels) -> ReadParams<'a> {
        ReadParams {
            stripe: self.stripe,
            labels,
            flat_map: self.flat_map.for_child(),
        }
    }

    /// Parameters for a struct field, which keeps the key selection callback.
    pub fn for_field(&self, labels: StreamLabels) -> ReadParams<'a> {
        ReadParams {
            stripe: self.stripe,
            labels,
            flat_map: self.flat_map.for_field(),
        }
    }
}
