//! Reader of `struct` columns.

use std::sync::Arc;

use strata_common::Result;
use strata_format::{scan_spec::ScanSpec, schema::TypeWithId};
use strata_sequence::{presence::Presence, sequence::Sequence, struct_sequence::StructSequence};

use super::{ColumnNode, ColumnReader, build_reader, verify_pairing};
use crate::read::{params::ReadParams, presence::PresenceDecoder};

/// Reads a struct column. Fields hold entries only for present struct rows;
/// fields whose file node is not selected are pruned.
pub struct StructReader {
    pub(super) node: ColumnNode,
    presence: PresenceDecoder,
    field_names: Vec<Arc<str>>,
    fields: Vec<ColumnReader>,
}

impl StructReader {
    pub fn new(
        requested: &Arc<TypeWithId>,
        file: &Arc<TypeWithId>,
        mut params: ReadParams,
        spec: &mut ScanSpec,
    ) -> Result<StructReader> {
        verify_pairing(requested, file)?;
        let key = params.encoding_key(file.id());
        let presence = PresenceDecoder::new(key, &mut params)?;

        let mut field_names = Vec::new();
        let mut fields = Vec::new();
        for (index, requested_field) in requested.children().iter().enumerate() {
            let file_field = file.child_at(index)?;
            let name = requested.field_name(index).unwrap_or_default();
            if !params.stripe.column_selector().should_read_node(file_field.id()) {
                log::trace!("pruning unselected field '{name}' (node {})", file_field.id());
                continue;
            }
            let child_params = params.for_field(params.labels.append(name));
            let reader = build_reader(
                requested_field,
                file_field,
                child_params,
                field_spec(spec, name),
            )?;
            field_names.push(Arc::from(name));
            fields.push(reader);
        }

        Ok(StructReader {
            node: ColumnNode::new(requested, file, key),
            presence,
            field_names,
            fields,
        })
    }

    /// Selected fields with their names, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ColumnReader)> {
        self.field_names
            .iter()
            .map(|name| name.as_ref())
            .zip(self.fields.iter())
    }

    pub(super) fn read(
        &mut self,
        rows: usize,
        include: Option<&[bool]>,
    ) -> Result<Box<dyn Sequence>> {
        let flags = self.presence.read(rows)?;
        let is_present = |row: usize| flags.as_ref().is_none_or(|flags| flags[row]);
        let is_included = |row: usize| include.is_none_or(|include| include[row]);

        let present_rows: Vec<usize> = (0..rows).filter(|&row| is_present(row)).collect();
        let field_mask = include
            .is_some_and(|_| present_rows.iter().any(|&row| !is_included(row)))
            .then(|| present_rows.iter().map(|&row| is_included(row)).collect::<Vec<_>>());
        let out_present: Vec<bool> = (0..rows)
            .filter(|&row| is_included(row))
            .map(is_present)
            .collect();

        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &mut self.fields {
            fields.push(field.read(present_rows.len(), field_mask.as_deref())?);
        }
        let sequence = StructSequence::try_new(
            self.field_names.clone(),
            fields,
            Presence::from_flags(&out_present),
        )?;
        Ok(Box::new(sequence))
    }

    pub(super) fn skip(&mut self, rows: u64) -> Result<()> {
        let present = self.presence.skip(rows)?;
        for field in &mut self.fields {
            field.skip(present)?;
        }
        Ok(())
    }
}

/// Projection node of a struct field, created fully materialized when the
/// caller did not describe the field.
fn field_spec<'a>(spec: &'a mut ScanSpec, name: &str) -> &'a mut ScanSpec {
    if spec.child_by_name(name).is_none() {
        let child = spec.get_or_create_child(name);
        child.set_project_out(true);
        child.set_extract_values(true);
    }
    spec.get_or_create_child(name)
}
