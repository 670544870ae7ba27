//! Reader of `map` columns stored with the default (non-flat) encoding.

use std::sync::Arc;

use strata_common::Result;
use strata_format::{scan_spec::ScanSpec, schema::TypeWithId};
use strata_sequence::{map_sequence::MapSequence, sequence::Sequence};

use super::{
    ColumnNode, ColumnReader, build_reader, make_length_decoder, prepare_map_spec,
    repeated::RepeatedShape, require_selected, verify_pairing,
};
use crate::read::{params::ReadParams, presence::PresenceDecoder};

/// Reads a map column: a LENGTH stream, an optional PRESENT stream and the
/// key and value columns, both addressed in entry space.
pub struct MapReader {
    pub(super) node: ColumnNode,
    shape: RepeatedShape,
    keys: Box<ColumnReader>,
    values: Box<ColumnReader>,
}

impl MapReader {
    /// Builds the map reader and, recursively, its key and value readers.
    ///
    /// Both key and value columns must be selected; the check covers both
    /// before either child reader is built.
    pub fn new(
        requested: &Arc<TypeWithId>,
        file: &Arc<TypeWithId>,
        mut params: ReadParams,
        spec: &mut ScanSpec,
    ) -> Result<MapReader> {
        // Opened ahead of the checks below, so the LENGTH stream counts as
        // in use even when one of them fails.
        let lengths = make_length_decoder(file, &params)?;
        verify_pairing(requested, file)?;
        prepare_map_spec(spec)?;

        let file_keys = file.child_at(0)?;
        let file_values = file.child_at(1)?;
        require_selected(&params, file_keys, "map key")?;
        require_selected(&params, file_values, "map value")?;

        let key = params.encoding_key(file.id());
        let presence = PresenceDecoder::new(key, &mut params)?;
        let (key_spec, value_spec) = spec.children_mut().split_at_mut(1);
        let keys = build_reader(
            requested.child_at(0)?,
            file_keys,
            params.for_child(params.labels.clone()),
            &mut key_spec[0],
        )?;
        let values = build_reader(
            requested.child_at(1)?,
            file_values,
            params.for_child(params.labels.clone()),
            &mut value_spec[0],
        )?;

        Ok(MapReader {
            node: ColumnNode::new(requested, file, key),
            shape: RepeatedShape::new(lengths, presence),
            keys: Box::new(keys),
            values: Box::new(values),
        })
    }

    pub fn keys(&self) -> &ColumnReader {
        &self.keys
    }

    pub fn values(&self) -> &ColumnReader {
        &self.values
    }

    pub(super) fn read(
        &mut self,
        rows: usize,
        include: Option<&[bool]>,
    ) -> Result<Box<dyn Sequence>> {
        let batch = self.shape.read_batch(rows, include)?;
        let keys = batch.read_child(&mut self.keys)?;
        let values = batch.read_child(&mut self.values)?;
        let map = MapSequence::try_new(Some(keys), Some(values), batch.offsets, batch.presence)?;
        Ok(Box::new(map))
    }

    pub(super) fn skip(&mut self, rows: u64) -> Result<()> {
        let entries = self.shape.skip(rows)?;
        self.keys.skip(entries)?;
        self.values.skip(entries)
    }
}
