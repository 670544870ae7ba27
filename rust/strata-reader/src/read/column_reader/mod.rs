//! Column readers and the recursive reader factory.
//!
//! [`build_reader`] turns a pair of requested and file type nodes into a
//! [`ColumnReader`], recursing into container children. The resulting tree
//! mirrors the projected part of the type tree: every container exclusively
//! owns its child readers and every reader owns the decoders of the streams it
//! opened, so a scan is aborted by simply dropping the tree.
//!
//! All construction errors surface from [`build_reader`] before any row is
//! decoded:
//! - a mandatory list/map child that is not selected is a configuration error
//! - a requested/file node pair with different ids is a consistency error
//! - a missing encoding descriptor or required stream is a missing resource

use std::sync::Arc;

use strata_common::{Result, error::Error, verify_arg};
use strata_encodings::int_decoder::{INT_BYTE_SIZE, IntDecoder, create_rle_decoder};
use strata_format::{
    scan_spec::ScanSpec,
    schema::{TypeKind, TypeWithId},
    stream::{ColumnEncodingKind, EncodingKey, StreamKind},
};
use strata_sequence::sequence::Sequence;

use crate::read::params::ReadParams;

mod flat_map_reader;
mod list_reader;
mod map_reader;
mod primitive_reader;
mod repeated;
mod struct_reader;

pub use flat_map_reader::{FlatMapEntry, FlatMapReader};
pub use list_reader::ListReader;
pub use map_reader::MapReader;
pub use primitive_reader::PrimitiveReader;
pub use struct_reader::StructReader;

/// A reader for one column of one stripe.
pub enum ColumnReader {
    Primitive(PrimitiveReader),
    List(ListReader),
    Map(MapReader),
    Struct(StructReader),
    FlatMap(FlatMapReader),
}

/// Builds the reader of the column described by the `requested` and `file`
/// type nodes, recursing into its children.
///
/// `spec` is the projection node of the column. It is augmented in place with
/// the mandatory children of lists and maps and may be reused when the reader
/// tree is rebuilt for the next stripe of the same schema.
///
/// # Errors
///
/// - `Consistency` if the two type nodes carry different ids
/// - `Configuration` if the file kind cannot be read as the requested kind or
///   a mandatory container child is not selected
/// - `MissingResource` if an encoding descriptor or required stream is absent
/// - `NotImplemented` for encodings without a reader
pub fn build_reader(
    requested: &Arc<TypeWithId>,
    file: &Arc<TypeWithId>,
    params: ReadParams,
    spec: &mut ScanSpec,
) -> Result<ColumnReader> {
    verify_pairing(requested, file)?;
    log::debug!(
        "building {} reader for node {} (sequence {}) at '{}'",
        file.kind(),
        file.id(),
        params.flat_map.sequence,
        params.labels.as_str()
    );
    match file.kind() {
        TypeKind::List => ListReader::new(requested, file, params, spec).map(ColumnReader::List),
        TypeKind::Map => {
            let encoding = params.stripe.get_encoding(params.encoding_key(file.id()))?;
            if encoding.kind == ColumnEncodingKind::MapFlat {
                FlatMapReader::new(requested, file, params, spec).map(ColumnReader::FlatMap)
            } else {
                MapReader::new(requested, file, params, spec).map(ColumnReader::Map)
            }
        }
        TypeKind::Struct => {
            StructReader::new(requested, file, params, spec).map(ColumnReader::Struct)
        }
        _ => PrimitiveReader::new(requested, file, params).map(ColumnReader::Primitive),
    }
}

/// Creates the unsigned decoder over the LENGTH stream of `file` under the
/// current flat-map sequence.
///
/// The stream is addressed by the container's own node id and the inherited
/// sequence; its run-length version follows the column's encoding kind.
pub fn make_length_decoder(file: &TypeWithId, params: &ReadParams) -> Result<Box<dyn IntDecoder>> {
    let key = params.encoding_key(file.id());
    let encoding = params.stripe.get_encoding(key)?;
    let version = encoding.kind.rle_version()?;
    let id = key.for_kind(StreamKind::Length);
    let use_vints = params.stripe.use_vints(&id);
    let stream = params
        .stripe
        .get_stream(&id, params.labels.as_str(), true)?
        .ok_or_else(|| {
            Error::missing_resource(format!("stream {id}"), "length stream is missing")
        })?;
    log::trace!("length decoder for {id}: {version:?}, vints: {use_vints}");
    create_rle_decoder::<false>(version, stream, use_vints, INT_BYTE_SIZE)
}

/// Ensures a list projection node has exactly its `elements` child, creating
/// it if the node has no children, and marks it for materialization.
///
/// Idempotent: an existing child is neither duplicated nor reordered.
pub fn prepare_list_spec(spec: &mut ScanSpec) -> Result<()> {
    if spec.children().is_empty() {
        spec.get_or_create_child(ScanSpec::ARRAY_ELEMENTS);
    }
    verify_arg!(spec, spec.children().len() == 1);
    materialize_children(spec);
    Ok(())
}

/// Ensures a map projection node has exactly its `key` and `value` children,
/// in this order, creating them if the node has no children, and marks both
/// for materialization.
pub fn prepare_map_spec(spec: &mut ScanSpec) -> Result<()> {
    if spec.children().is_empty() {
        spec.get_or_create_child(ScanSpec::MAP_KEYS);
        spec.get_or_create_child(ScanSpec::MAP_VALUES);
    }
    verify_arg!(
        spec,
        spec.children().len() == 2
            && spec.children()[0].field_name() == ScanSpec::MAP_KEYS
            && spec.children()[1].field_name() == ScanSpec::MAP_VALUES
    );
    materialize_children(spec);
    Ok(())
}

fn materialize_children(spec: &mut ScanSpec) {
    for child in spec.children_mut() {
        child.set_project_out(true);
        child.set_extract_values(true);
    }
}

/// Checks that a requested node is paired with the file node of the same id
/// and that the file kind can be read as the requested kind.
pub(crate) fn verify_pairing(requested: &TypeWithId, file: &TypeWithId) -> Result<()> {
    if requested.id() != file.id() {
        return Err(Error::consistency(format!(
            "requested node {} is paired with file node {}",
            requested.id(),
            file.id()
        )));
    }
    if !file.kind().can_read_as(requested.kind()) {
        return Err(Error::configuration(format!(
            "node {}: {} column cannot be read as {}",
            file.id(),
            file.kind(),
            requested.kind()
        )));
    }
    Ok(())
}

/// Fails with a configuration error unless the column selector selects `node`.
pub(crate) fn require_selected(params: &ReadParams, node: &TypeWithId, what: &str) -> Result<()> {
    if params.stripe.column_selector().should_read_node(node.id()) {
        return Ok(());
    }
    Err(Error::configuration(format!(
        "{what} (node {}) of '{}' must be selected",
        node.id(),
        params.labels.as_str()
    )))
}

/// Identity and progress shared by every reader.
pub(crate) struct ColumnNode {
    requested: Arc<TypeWithId>,
    file: Arc<TypeWithId>,
    key: EncodingKey,
    position: u64,
}

impl ColumnNode {
    fn new(requested: &Arc<TypeWithId>, file: &Arc<TypeWithId>, key: EncodingKey) -> ColumnNode {
        ColumnNode {
            requested: requested.clone(),
            file: file.clone(),
            key,
            position: 0,
        }
    }
}

impl ColumnReader {
    fn node(&self) -> &ColumnNode {
        match self {
            ColumnReader::Primitive(reader) => &reader.node,
            ColumnReader::List(reader) => &reader.node,
            ColumnReader::Map(reader) => &reader.node,
            ColumnReader::Struct(reader) => &reader.node,
            ColumnReader::FlatMap(reader) => &reader.node,
        }
    }

    fn node_mut(&mut self) -> &mut ColumnNode {
        match self {
            ColumnReader::Primitive(reader) => &mut reader.node,
            ColumnReader::List(reader) => &mut reader.node,
            ColumnReader::Map(reader) => &mut reader.node,
            ColumnReader::Struct(reader) => &mut reader.node,
            ColumnReader::FlatMap(reader) => &mut reader.node,
        }
    }

    pub fn file_type(&self) -> &Arc<TypeWithId> {
        &self.node().file
    }

    pub fn requested_type(&self) -> &Arc<TypeWithId> {
        &self.node().requested
    }

    /// Encoding key the reader's streams are addressed with.
    pub fn encoding_key(&self) -> EncodingKey {
        self.node().key
    }

    /// Number of rows read or skipped so far.
    pub fn position(&self) -> u64 {
        self.node().position
    }

    /// Child readers in fixed order: the elements of a list, key then value of
    /// a map, the selected fields of a struct, the per-key value readers of a
    /// flat map.
    pub fn children(&self) -> Vec<&ColumnReader> {
        match self {
            ColumnReader::Primitive(_) => Vec::new(),
            ColumnReader::List(reader) => vec![reader.elements()],
            ColumnReader::Map(reader) => vec![reader.keys(), reader.values()],
            ColumnReader::Struct(reader) => reader.fields().map(|(_, field)| field).collect(),
            ColumnReader::FlatMap(reader) => {
                reader.entries().iter().map(|entry| &entry.reader).collect()
            }
        }
    }

    /// Decodes the next `rows` rows.
    ///
    /// `include`, when given, holds one flag per row; the returned sequence
    /// has one entry per included row. Excluded rows are consumed all the same.
    pub fn read(&mut self, rows: usize, include: Option<&[bool]>) -> Result<Box<dyn Sequence>> {
        if let Some(include) = include {
            verify_arg!(include, include.len() == rows);
        }
        let sequence = match self {
            ColumnReader::Primitive(reader) => reader.read(rows, include),
            ColumnReader::List(reader) => reader.read(rows, include),
            ColumnReader::Map(reader) => reader.read(rows, include),
            ColumnReader::Struct(reader) => reader.read(rows, include),
            ColumnReader::FlatMap(reader) => reader.read(rows, include),
        }?;
        self.node_mut().position += rows as u64;
        Ok(sequence)
    }

    /// Consumes the next `rows` rows without materializing them.
    pub fn skip(&mut self, rows: u64) -> Result<()> {
        if rows == 0 {
            return Ok(());
        }
        match self {
            ColumnReader::Primitive(reader) => reader.skip(rows),
            ColumnReader::List(reader) => reader.skip(rows),
            ColumnReader::Map(reader) => reader.skip(rows),
            ColumnReader::Struct(reader) => reader.skip(rows),
            ColumnReader::FlatMap(reader) => reader.skip(rows),
        }?;
        self.node_mut().position += rows;
        Ok(())
    }

    /// Advances to `row`.
    ///
    /// # Errors
    ///
    /// Stream cursors only move forward; seeking before the current position
    /// is an `InvalidArgument` error.
    pub fn seek_to_row(&mut self, row: u64) -> Result<()> {
        let position = self.position();
        if row < position {
            return Err(Error::invalid_arg(
                "row",
                format!("cannot seek back to row {row} from row {position}"),
            ));
        }
        self.skip(row - position)
    }

    /// Estimated decoded size of one row in bytes, counting one element per
    /// list or map row. `None` when a variable-width column is involved.
    pub fn estimated_row_size(&self) -> Option<usize> {
        match self {
            ColumnReader::Primitive(_) => self.requested_type().kind().fixed_width(),
            ColumnReader::List(_) | ColumnReader::Map(_) => self
                .children()
                .into_iter()
                .try_fold(INT_BYTE_SIZE, |size, child| {
                    Some(size + child.estimated_row_size()?)
                }),
            ColumnReader::Struct(_) | ColumnReader::FlatMap(_) => self
                .children()
                .into_iter()
                .try_fold(0, |size, child| Some(size + child.estimated_row_size()?)),
        }
    }

    pub fn as_list(&self) -> Option<&ListReader> {
        match self {
            ColumnReader::List(reader) => Some(reader),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapReader> {
        match self {
            ColumnReader::Map(reader) => Some(reader),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructReader> {
        match self {
            ColumnReader::Struct(reader) => Some(reader),
            _ => None,
        }
    }

    pub fn as_flat_map(&self) -> Option<&FlatMapReader> {
        match self {
            ColumnReader::FlatMap(reader) => Some(reader),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ColumnReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            ColumnReader::Primitive(_) => "Primitive",
            ColumnReader::List(_) => "List",
            ColumnReader::Map(_) => "Map",
            ColumnReader::Struct(_) => "Struct",
            ColumnReader::FlatMap(_) => "FlatMap",
        };
        f.debug_struct(variant)
            .field("node", &self.file_type().id())
            .field("key", &self.encoding_key())
            .field("position", &self.position())
            .field("children", &self.children())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_list_spec_is_idempotent() {
        let mut spec = ScanSpec::new("tags");
        prepare_list_spec(&mut spec).unwrap();
        prepare_list_spec(&mut spec).unwrap();
        assert_eq!(spec.children().len(), 1);
        let elements = &spec.children()[0];
        assert_eq!(elements.field_name(), ScanSpec::ARRAY_ELEMENTS);
        assert!(elements.project_out() && elements.extract_values());
    }

    #[test]
    fn test_prepare_map_spec_forces_flags_on_existing_children() {
        let mut spec = ScanSpec::new("attrs");
        spec.add_child(ScanSpec::new(ScanSpec::MAP_KEYS));
        spec.add_child(ScanSpec::new(ScanSpec::MAP_VALUES));
        prepare_map_spec(&mut spec).unwrap();
        let names: Vec<_> = spec.children().iter().map(|c| c.field_name()).collect();
        assert_eq!(names, vec![ScanSpec::MAP_KEYS, ScanSpec::MAP_VALUES]);
        assert!(
            spec.children()
                .iter()
                .all(|c| c.project_out() && c.extract_values())
        );
    }

    #[test]
    fn test_prepare_spec_rejects_wrong_arity() {
        let mut spec = ScanSpec::new("attrs");
        spec.add_child(ScanSpec::new(ScanSpec::MAP_VALUES));
        assert!(prepare_map_spec(&mut spec).is_err());

        let mut spec = ScanSpec::new("tags");
        spec.add_child(ScanSpec::new("a"));
        spec.add_child(ScanSpec::new("b"));
        assert!(prepare_list_spec(&mut spec).is_err());
    }
}
