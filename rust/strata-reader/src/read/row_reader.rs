//! Frames of top-level fields read from one stripe.

use std::sync::Arc;

use strata_common::{Result, error::Error, try_or_ret_some_err};
use strata_format::{
    filter::ValueFilter,
    scan_spec::ScanSpec,
    schema::{TypeKind, TypeWithId},
};
use strata_sequence::{frame::Frame, sequence::Sequence, value_sequence::ValueSequence};

use crate::{
    config::ReaderConfig,
    read::{
        column_reader::{ColumnReader, build_reader, verify_pairing},
        params::{FlatMapContext, ReadParams, StreamLabels},
        presence::count_set,
        stripe_streams::StripeStreams,
    },
};

struct FieldReader {
    name: Arc<str>,
    reader: ColumnReader,
    filter: Option<Arc<dyn ValueFilter>>,
    project_out: bool,
}

/// Reads the projected top-level fields of a stripe in batches.
///
/// Fields whose projection node carries a filter are read first; the rows
/// they reject are excluded from every other field and from the frame.
/// A batch in which no row passes yields an empty frame.
pub struct StripeRowReader {
    fields: Vec<FieldReader>,
    row_count: u64,
    position: u64,
    batch_size: usize,
}

impl StripeRowReader {
    /// Builds the readers of the projected top-level fields.
    ///
    /// A root projection node without children projects every selected
    /// field. Otherwise only fields with a child that is projected out or
    /// filtered are read.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid `config`, a non-struct
    /// root or a filter on a container field, `NotImplemented` for a field
    /// holding a flat-map encoded map, and any error raised while building a
    /// field reader. Key selection statistics of flat maps are reported
    /// before the field is rejected.
    pub fn new(
        requested_root: &Arc<TypeWithId>,
        file_root: &Arc<TypeWithId>,
        stripe: &dyn StripeStreams,
        spec: &mut ScanSpec,
        config: ReaderConfig,
    ) -> Result<StripeRowReader> {
        config.validate()?;
        verify_pairing(requested_root, file_root)?;
        if file_root.kind() != TypeKind::Struct {
            return Err(Error::configuration(format!(
                "the root of a stripe must be a struct, found {}",
                file_root.kind()
            )));
        }

        let labels = StreamLabels::new(&config.stream_label_root);
        let project_all = spec.children().is_empty();
        let mut fields = Vec::new();
        for (index, requested_field) in requested_root.children().iter().enumerate() {
            let file_field = file_root.child_at(index)?;
            let name = requested_root.field_name(index).unwrap_or_default();
            if !stripe.column_selector().should_read_node(file_field.id()) {
                continue;
            }
            if project_all {
                let child = spec.get_or_create_child(name);
                child.set_project_out(true);
                child.set_extract_values(true);
            }
            let Some(field_spec) = spec.child_by_name(name) else {
                continue;
            };
            if !field_spec.project_out() && !field_spec.has_filter() {
                continue;
            }
            let filter = field_spec.filter().cloned();
            let project_out = field_spec.project_out();
            if filter.is_some() && file_field.kind().is_container() {
                return Err(Error::configuration(format!(
                    "filter on {} field '{name}' (node {}) is not supported",
                    file_field.kind(),
                    file_field.id()
                )));
            }

            let params = ReadParams::new(stripe, labels.append(name)).with_flat_map(FlatMapContext {
                sequence: 0,
                in_map_decoder: None,
                key_selection_callback: config.key_selection_callback.clone(),
            });
            let reader = build_reader(
                requested_field,
                file_field,
                params,
                spec.get_or_create_child(name),
            )?;
            if let Some(flat_map) = find_flat_map(&reader) {
                return Err(Error::not_implemented(format!(
                    "field '{name}' contains flat-map column (node {}), which cannot be \
                     read into a frame",
                    flat_map.file_type().id()
                )));
            }
            fields.push(FieldReader {
                name: Arc::from(name),
                reader,
                filter,
                project_out,
            });
        }
        log::debug!(
            "stripe row reader over {} rows with {} field readers",
            stripe.row_count(),
            fields.len()
        );

        Ok(StripeRowReader {
            fields,
            row_count: stripe.row_count(),
            position: 0,
            batch_size: config.batch_size,
        })
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Index of the next row to read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reader of the top-level field `name`, if it is read.
    pub fn field_reader(&self, name: &str) -> Option<&ColumnReader> {
        self.fields
            .iter()
            .find(|field| field.name.as_ref() == name)
            .map(|field| &field.reader)
    }

    /// Advances every field to `row`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `row` is behind the current position or
    /// past the end of the stripe.
    pub fn seek_to_row(&mut self, row: u64) -> Result<()> {
        if row > self.row_count {
            return Err(Error::invalid_arg(
                "row",
                format!("row {row} is past the end of the stripe ({})", self.row_count),
            ));
        }
        for field in &mut self.fields {
            field.reader.seek_to_row(row)?;
        }
        self.position = row;
        Ok(())
    }

    fn read_batch(&mut self, rows: usize) -> Result<Frame> {
        let mut outputs: Vec<Option<Box<dyn Sequence>>> =
            (0..self.fields.len()).map(|_| None).collect();

        let mut mask: Option<Vec<bool>> = None;
        for (index, field) in self.fields.iter_mut().enumerate() {
            let Some(filter) = field.filter.as_deref() else {
                continue;
            };
            let sequence = field.reader.read(rows, None)?;
            let values = sequence.downcast_ref::<ValueSequence>().ok_or_else(|| {
                Error::invalid_operation(format!("filtering field '{}'", field.name))
            })?;
            let passed = mask.get_or_insert_with(|| vec![true; rows]);
            for (row, pass) in passed.iter_mut().enumerate() {
                *pass = *pass && test_value(filter, values, row);
            }
            if field.project_out {
                outputs[index] = Some(sequence);
            }
        }

        let mask = mask.filter(|mask| mask.iter().any(|&pass| !pass));
        let len = mask.as_deref().map_or(rows, count_set);
        for (index, field) in self.fields.iter_mut().enumerate() {
            if field.filter.is_some() {
                let (Some(mask), Some(sequence)) = (mask.as_deref(), outputs[index].as_ref())
                else {
                    continue;
                };
                if let Some(values) = sequence.downcast_ref::<ValueSequence>() {
                    outputs[index] = Some(Box::new(values.select(mask)));
                }
            } else {
                outputs[index] = Some(field.reader.read(rows, mask.as_deref())?);
            }
        }

        let mut field_names = Vec::new();
        let mut sequences = Vec::new();
        for (field, output) in self.fields.iter().zip(outputs) {
            if let Some(sequence) = output {
                field_names.push(field.name.clone());
                sequences.push(sequence);
            }
        }
        Frame::try_new(field_names, sequences, len)
    }
}

impl Iterator for StripeRowReader {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.row_count {
            return None;
        }
        let rows = (self.row_count - self.position).min(self.batch_size as u64) as usize;
        let frame = try_or_ret_some_err!(self.read_batch(rows));
        self.position += rows as u64;
        Some(Ok(frame))
    }
}

fn find_flat_map(reader: &ColumnReader) -> Option<&ColumnReader> {
    if reader.as_flat_map().is_some() {
        return Some(reader);
    }
    reader.children().into_iter().find_map(find_flat_map)
}

fn test_value(filter: &dyn ValueFilter, values: &ValueSequence, row: usize) -> bool {
    if values.presence.is_null(row) {
        return filter.test_null();
    }
    match values.kind {
        TypeKind::Boolean => filter.test_bool(values.integer_at(row).is_some_and(|v| v != 0)),
        TypeKind::Float | TypeKind::Double => {
            values.float_at(row).is_some_and(|v| filter.test_f64(v))
        }
        TypeKind::String | TypeKind::Binary => filter.test_bytes(values.binary_at(row)),
        _ => values.integer_at(row).is_some_and(|v| filter.test_i64(v)),
    }
}
