//! Reader of `list` columns.

use std::sync::Arc;

use strata_common::Result;
use strata_format::{scan_spec::ScanSpec, schema::TypeWithId};
use strata_sequence::{list_sequence::ListSequence, sequence::Sequence};

use super::{
    ColumnNode, ColumnReader, build_reader, make_length_decoder, prepare_list_spec,
    repeated::RepeatedShape, require_selected, verify_pairing,
};
use crate::read::{params::ReadParams, presence::PresenceDecoder};

/// Reads a list column: a LENGTH stream, an optional PRESENT stream and the
/// elements column addressed in element space.
pub struct ListReader {
    pub(super) node: ColumnNode,
    shape: RepeatedShape,
    elements: Box<ColumnReader>,
}

impl ListReader {
    /// Builds the list reader and, recursively, its elements reader.
    ///
    /// The elements child of `spec` is created if missing and always
    /// materialized. The elements column must be selected.
    pub fn new(
        requested: &Arc<TypeWithId>,
        file: &Arc<TypeWithId>,
        mut params: ReadParams,
        spec: &mut ScanSpec,
    ) -> Result<ListReader> {
        // Opened ahead of the checks below, so the LENGTH stream counts as
        // in use even when one of them fails.
        let lengths = make_length_decoder(file, &params)?;
        verify_pairing(requested, file)?;
        prepare_list_spec(spec)?;

        let file_elements = file.child_at(0)?;
        require_selected(&params, file_elements, "list elements")?;

        let key = params.encoding_key(file.id());
        let presence = PresenceDecoder::new(key, &mut params)?;
        let child_params = params.for_child(params.labels.clone());
        let elements = build_reader(
            requested.child_at(0)?,
            file_elements,
            child_params,
            &mut spec.children_mut()[0],
        )?;

        Ok(ListReader {
            node: ColumnNode::new(requested, file, key),
            shape: RepeatedShape::new(lengths, presence),
            elements: Box::new(elements),
        })
    }

    pub fn elements(&self) -> &ColumnReader {
        &self.elements
    }

    pub(super) fn read(
        &mut self,
        rows: usize,
        include: Option<&[bool]>,
    ) -> Result<Box<dyn Sequence>> {
        let batch = self.shape.read_batch(rows, include)?;
        let item = batch.read_child(&mut self.elements)?;
        let list = ListSequence::try_new(Some(item), batch.offsets, batch.presence)?;
        Ok(Box::new(list))
    }

    pub(super) fn skip(&mut self, rows: u64) -> Result<()> {
        let elements = self.shape.skip(rows)?;
        self.elements.skip(elements)
    }
}
