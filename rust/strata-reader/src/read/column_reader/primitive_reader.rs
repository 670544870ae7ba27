//! Reader of scalar columns.

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use strata_common::{Result, error::Error, verify_data};
use strata_encodings::{
    boolean_rle::BooleanRleDecoder,
    byte_rle::ByteRleDecoder,
    input_stream::InputStream,
    int_decoder::{IntDecoder, create_rle_decoder},
};
use strata_format::{
    schema::{TypeKind, TypeWithId},
    stream::{EncodingKey, StreamKind},
};
use strata_sequence::{sequence::Sequence, value_sequence::ValueSequence};

use super::{ColumnNode, make_length_decoder, verify_pairing};
use crate::read::{
    params::ReadParams,
    presence::{PresenceDecoder, SKIP_CHUNK_ROWS, count_set},
};

enum ValueDecoder {
    Boolean(BooleanRleDecoder),
    Byte(ByteRleDecoder),
    Integer(Box<dyn IntDecoder>),
    /// Little-endian IEEE 754 values of `width` bytes.
    Float {
        data: InputStream,
        width: usize,
    },
    Bytes {
        lengths: Box<dyn IntDecoder>,
        data: InputStream,
    },
}

/// Reads a boolean, integer, floating point, string or binary column stored
/// with a direct encoding.
///
/// Values are produced in the requested kind, widening integers and floats
/// when the file kind is narrower.
pub struct PrimitiveReader {
    pub(super) node: ColumnNode,
    presence: PresenceDecoder,
    values: ValueDecoder,
}

impl PrimitiveReader {
    pub fn new(
        requested: &Arc<TypeWithId>,
        file: &Arc<TypeWithId>,
        mut params: ReadParams,
    ) -> Result<PrimitiveReader> {
        verify_pairing(requested, file)?;
        let key = params.encoding_key(file.id());
        let encoding = params.stripe.get_encoding(key)?;
        if encoding.kind.is_dictionary() {
            return Err(Error::not_implemented(format!(
                "dictionary encoded {} column (node {})",
                file.kind(),
                file.id()
            )));
        }

        let values = match file.kind() {
            TypeKind::Boolean => {
                ValueDecoder::Boolean(BooleanRleDecoder::new(data_stream(key, &params)?))
            }
            TypeKind::Byte => ValueDecoder::Byte(ByteRleDecoder::new(data_stream(key, &params)?)),
            TypeKind::Short | TypeKind::Int | TypeKind::Long => {
                let id = key.for_kind(StreamKind::Data);
                let width = file.kind().fixed_width().unwrap_or(8);
                ValueDecoder::Integer(create_rle_decoder::<true>(
                    encoding.kind.rle_version()?,
                    data_stream(key, &params)?,
                    params.stripe.use_vints(&id),
                    width,
                )?)
            }
            TypeKind::Float | TypeKind::Double => ValueDecoder::Float {
                data: data_stream(key, &params)?,
                width: file.kind().fixed_width().unwrap_or(8),
            },
            TypeKind::String | TypeKind::Binary => ValueDecoder::Bytes {
                lengths: make_length_decoder(file, &params)?,
                data: data_stream(key, &params)?,
            },
            kind => {
                return Err(Error::not_implemented(format!(
                    "reading {kind} column (node {})",
                    file.id()
                )));
            }
        };
        let presence = PresenceDecoder::new(key, &mut params)?;

        Ok(PrimitiveReader {
            node: ColumnNode::new(requested, file, key),
            presence,
            values,
        })
    }

    pub(super) fn read(
        &mut self,
        rows: usize,
        include: Option<&[bool]>,
    ) -> Result<Box<dyn Sequence>> {
        let flags = self.presence.read(rows)?;
        let is_present = |row: usize| flags.as_ref().is_none_or(|flags| flags[row]);
        let is_included = |row: usize| include.is_none_or(|include| include[row]);
        let kind = self.node.requested.kind();
        let out_len = include.map_or(rows, count_set);
        let mut out = ValueSequence::with_capacity(kind, out_len);

        match &mut self.values {
            ValueDecoder::Boolean(decoder) => {
                let mut values = vec![false; rows];
                decoder.next(&mut values, flags.as_deref())?;
                for row in (0..rows).filter(|&row| is_included(row)) {
                    if is_present(row) {
                        out.push_value(u8::from(values[row]));
                    } else {
                        out.push_null();
                    }
                }
            }
            ValueDecoder::Byte(decoder) => {
                let mut values = vec![0u8; rows];
                decoder.next(&mut values, flags.as_deref())?;
                for row in (0..rows).filter(|&row| is_included(row)) {
                    if is_present(row) {
                        push_integer(&mut out, i64::from(values[row] as i8));
                    } else {
                        out.push_null();
                    }
                }
            }
            ValueDecoder::Integer(decoder) => {
                let mut values = vec![0i64; rows];
                decoder.next(&mut values, flags.as_deref())?;
                for row in (0..rows).filter(|&row| is_included(row)) {
                    if is_present(row) {
                        push_integer(&mut out, values[row]);
                    } else {
                        out.push_null();
                    }
                }
            }
            ValueDecoder::Float { data, width } => {
                for row in 0..rows {
                    if !is_present(row) {
                        if is_included(row) {
                            out.push_null();
                        }
                        continue;
                    }
                    let bytes = data.read_bytes(*width)?;
                    if !is_included(row) {
                        continue;
                    }
                    let value = if *width == 4 {
                        f64::from(LittleEndian::read_f32(bytes))
                    } else {
                        LittleEndian::read_f64(bytes)
                    };
                    if kind == TypeKind::Float {
                        out.push_value(value as f32);
                    } else {
                        out.push_value(value);
                    }
                }
            }
            ValueDecoder::Bytes { lengths, data } => {
                let mut raw = vec![0i64; rows];
                lengths.next(&mut raw, flags.as_deref())?;
                for (row, &len) in raw.iter().enumerate() {
                    verify_data!(length, len >= 0);
                    if !is_present(row) {
                        if is_included(row) {
                            out.push_null();
                        }
                        continue;
                    }
                    let bytes = data.read_bytes(len as usize)?;
                    if is_included(row) {
                        out.push_binary(bytes);
                    }
                }
            }
        }
        Ok(Box::new(out))
    }

    pub(super) fn skip(&mut self, rows: u64) -> Result<()> {
        let values = self.presence.skip(rows)?;
        match &mut self.values {
            ValueDecoder::Boolean(decoder) => decoder.skip(values),
            ValueDecoder::Byte(decoder) => decoder.skip(values),
            ValueDecoder::Integer(decoder) => decoder.skip(values),
            ValueDecoder::Float { data, width } => {
                let bytes = usize::try_from(values)
                    .ok()
                    .and_then(|values| values.checked_mul(*width));
                match bytes {
                    Some(bytes) => data.skip_bytes(bytes),
                    None => Err(Error::invalid_arg(
                        "rows",
                        format!("cannot skip {values} floating point values"),
                    )),
                }
            }
            ValueDecoder::Bytes { lengths, data } => {
                let mut values = values;
                while values > 0 {
                    let chunk = values.min(SKIP_CHUNK_ROWS);
                    let mut raw = vec![0i64; chunk as usize];
                    lengths.next(&mut raw, None)?;
                    for len in raw {
                        verify_data!(length, len >= 0);
                        data.skip_bytes(len as usize)?;
                    }
                    values -= chunk;
                }
                Ok(())
            }
        }
    }
}

fn data_stream(key: EncodingKey, params: &ReadParams) -> Result<InputStream> {
    let id = key.for_kind(StreamKind::Data);
    params
        .stripe
        .get_stream(&id, params.labels.as_str(), true)?
        .ok_or_else(|| Error::missing_resource(format!("stream {id}"), "data stream is missing"))
}

/// Appends an integer narrowed to the width of the sequence's kind. The value
/// always fits: the file kind is never wider than the requested one.
fn push_integer(out: &mut ValueSequence, value: i64) {
    match out.kind {
        TypeKind::Byte => out.push_value(value as i8),
        TypeKind::Short => out.push_value(value as i16),
        TypeKind::Int => out.push_value(value as i32),
        _ => out.push_value(value),
    }
}
