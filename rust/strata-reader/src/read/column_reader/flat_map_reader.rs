//! Reader construction for maps stored with the flat-map encoding.
//!
//! A flat map stores no key column and no LENGTH stream. Every distinct key
//! of the stripe owns one instance of the value column, addressed by a
//! sequence number greater than zero and carrying the key in its encoding
//! descriptor. The instance's IN_MAP stream tells for each map row whether
//! the key is present in it.

use std::sync::Arc;

use strata_common::{Result, error::Error};
use strata_encodings::boolean_rle::BooleanRleDecoder;
use strata_format::{
    filter::ValueFilter,
    scan_spec::ScanSpec,
    schema::TypeWithId,
    stream::{FlatMapKey, StreamIdentifier, StreamKind},
};
use strata_sequence::sequence::Sequence;

use super::{
    ColumnNode, ColumnReader, build_reader, prepare_map_spec, require_selected, verify_pairing,
};
use crate::read::{
    params::{FlatMapContext, KeySelectionStats, ReadParams},
    presence::PresenceDecoder,
};

/// The value reader of one key.
pub struct FlatMapEntry {
    pub key: FlatMapKey,
    pub sequence: u32,
    pub reader: ColumnReader,
}

/// Reader tree of a flat-map column: one value reader per selected key.
pub struct FlatMapReader {
    pub(super) node: ColumnNode,
    presence: PresenceDecoder,
    entries: Vec<FlatMapEntry>,
}

impl FlatMapReader {
    /// Builds a value reader for every key of the stripe that passes the
    /// filter of the `key` child of `spec`.
    ///
    /// Reports the selection to the key selection callback of `params`, if
    /// any.
    pub fn new(
        requested: &Arc<TypeWithId>,
        file: &Arc<TypeWithId>,
        mut params: ReadParams,
        spec: &mut ScanSpec,
    ) -> Result<FlatMapReader> {
        verify_pairing(requested, file)?;
        prepare_map_spec(spec)?;
        let file_values = file.child_at(1)?;
        let requested_values = requested.child_at(1)?;
        require_selected(&params, file_values, "map value")?;

        let key = params.encoding_key(file.id());
        let presence = PresenceDecoder::new(key, &mut params)?;
        let callback = params.flat_map.key_selection_callback.take();
        let key_filter = spec.children()[0].filter().cloned();

        let instances = params.stripe.sequences_of(file_values.id());
        let total_keys = instances.len();
        let mut entries = Vec::new();
        for (sequence, encoding) in instances {
            let Some(map_key) = encoding.key else {
                return Err(Error::invalid_format(format!(
                    "flat-map value instance {}:{sequence} has no key",
                    file_values.id()
                )));
            };
            if let Some(filter) = key_filter.as_deref() {
                if !key_passes(filter, &map_key) {
                    log::trace!("key {map_key} of node {} filtered out", file.id());
                    continue;
                }
            }

            let labels = params.labels.append(&map_key.to_string());
            let in_map_id = StreamIdentifier::new(file_values.id(), sequence, StreamKind::InMap);
            let in_map = params
                .stripe
                .get_stream(&in_map_id, labels.as_str(), true)?
                .ok_or_else(|| {
                    Error::missing_resource(
                        format!("stream {in_map_id}"),
                        "in-map stream is missing",
                    )
                })?;
            let value_params =
                ReadParams::new(params.stripe, labels).with_flat_map(FlatMapContext {
                    sequence,
                    in_map_decoder: Some(BooleanRleDecoder::new(in_map)),
                    key_selection_callback: None,
                });
            let reader = build_reader(
                requested_values,
                file_values,
                value_params,
                &mut spec.children_mut()[1],
            )?;
            entries.push(FlatMapEntry {
                key: map_key,
                sequence,
                reader,
            });
        }

        log::debug!(
            "flat map node {}: {} of {total_keys} keys selected",
            file.id(),
            entries.len()
        );
        if let Some(callback) = callback {
            callback(&KeySelectionStats {
                node: file.id(),
                total_keys,
                selected_keys: entries.len(),
            });
        }

        Ok(FlatMapReader {
            node: ColumnNode::new(requested, file, key),
            presence,
            entries,
        })
    }

    pub fn entries(&self) -> &[FlatMapEntry] {
        &self.entries
    }

    pub(super) fn read(
        &mut self,
        _rows: usize,
        _include: Option<&[bool]>,
    ) -> Result<Box<dyn Sequence>> {
        Err(Error::not_implemented(format!(
            "reading flat-map column (node {}) into a map sequence",
            self.node.file.id()
        )))
    }

    pub(super) fn skip(&mut self, rows: u64) -> Result<()> {
        let present = self.presence.skip(rows)?;
        for entry in &mut self.entries {
            entry.reader.skip(present)?;
        }
        Ok(())
    }
}

fn key_passes(filter: &dyn ValueFilter, key: &FlatMapKey) -> bool {
    match key {
        FlatMapKey::Int(value) => filter.test_i64(*value),
        FlatMapKey::Bytes(value) => filter.test_bytes(value),
    }
}
