//! Decoded column data produced by the Strata stripe readers.
//!
//! A sequence is an owned batch of values of a single logical type. Primitive
//! columns decode into a [`value_sequence::ValueSequence`]; containers decode
//! into [`list_sequence::ListSequence`], [`map_sequence::MapSequence`] and
//! [`struct_sequence::StructSequence`], which own their child sequences and
//! describe their shape through [`offsets::Offsets`] and
//! [`presence::Presence`].
//!
//! # Layout
//!
//! - Fixed-width values live in a contiguous, 8-byte aligned [`values::Values`]
//!   buffer.
//! - Strings and binaries store concatenated bytes plus `N + 1` offsets.
//! - Lists and maps store `N + 1` offsets into their flattened children. Null
//!   and excluded rows own no child elements.
//! - Struct fields hold one entry per non-null struct row.
//!
//! A batch of top-level fields is a [`frame::Frame`].

pub mod frame;
pub mod list_sequence;
pub mod map_sequence;
pub mod offsets;
pub mod presence;
pub mod sequence;
pub mod struct_sequence;
pub mod value_sequence;
pub mod values;
