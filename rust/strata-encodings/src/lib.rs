//! Decoders for the run-length encoded streams of a stripe.
//!
//! - [`input_stream::InputStream`]: a labeled cursor over one stream's bytes.
//! - [`byte_rle::ByteRleDecoder`] and [`boolean_rle::BooleanRleDecoder`]: byte
//!   runs and bit-packed booleans, used for presence and in-map streams.
//! - [`int_decoder::IntDecoder`]: integer run-length decoders (versions 1 and 2),
//!   created through [`int_decoder::create_rle_decoder`].

pub mod boolean_rle;
pub mod byte_rle;
pub mod input_stream;
pub mod int_decoder;
pub mod varint;

mod bit_reader;
mod rle_v1;
mod rle_v2;
