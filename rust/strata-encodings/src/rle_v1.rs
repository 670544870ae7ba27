//! Integer run-length encoding, version 1.
//!
//! Groups start with a control byte `h` read as a signed value:
//! - `h >= 0`: a run of `h + 3` values. A signed delta byte and the base value
//!   follow; the run is `base, base + delta, base + 2 * delta, ...`.
//! - `h < 0`: `-h` literal values follow.

use strata_common::Result;

use crate::{
    input_stream::InputStream,
    int_decoder::{IntDecoder, fill_with},
    varint::{read_fixed_le, read_vi64, read_vu64, skip_varint},
};

pub(crate) struct RleDecoderV1<const SIGNED: bool> {
    stream: InputStream,
    use_vints: bool,
    byte_width: usize,
    remaining: u64,
    repeating: bool,
    value: i64,
    delta: i64,
}

impl<const SIGNED: bool> RleDecoderV1<SIGNED> {
    pub fn new(stream: InputStream, use_vints: bool, byte_width: usize) -> Self {
        RleDecoderV1 {
            stream,
            use_vints,
            byte_width,
            remaining: 0,
            repeating: false,
            value: 0,
            delta: 0,
        }
    }

    fn read_value(&mut self) -> Result<i64> {
        if self.use_vints {
            if SIGNED {
                read_vi64(&mut self.stream)
            } else {
                read_vu64(&mut self.stream).map(|v| v as i64)
            }
        } else {
            read_fixed_le(&mut self.stream, self.byte_width, SIGNED)
        }
    }

    fn skip_value(&mut self) -> Result<()> {
        if self.use_vints {
            skip_varint(&mut self.stream)
        } else {
            self.stream.skip_bytes(self.byte_width)
        }
    }

    fn read_header(&mut self) -> Result<()> {
        let header = self.stream.read_byte()? as i8;
        if header < 0 {
            self.remaining = (-(header as i64)) as u64;
            self.repeating = false;
        } else {
            self.remaining = header as u64 + 3;
            self.repeating = true;
            self.delta = i64::from(self.stream.read_byte()? as i8);
            self.value = self.read_value()?;
        }
        Ok(())
    }

    fn next_value(&mut self) -> Result<i64> {
        if self.remaining == 0 {
            self.read_header()?;
        }
        self.remaining -= 1;
        if self.repeating {
            let value = self.value;
            self.value = self.value.wrapping_add(self.delta);
            Ok(value)
        } else {
            self.read_value()
        }
    }
}

impl<const SIGNED: bool> IntDecoder for RleDecoderV1<SIGNED> {
    fn next(&mut self, out: &mut [i64], non_null: Option<&[bool]>) -> Result<()> {
        fill_with(out, non_null, || self.next_value())
    }

    fn skip(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            if self.remaining == 0 {
                self.read_header()?;
            }
            let take = count.min(self.remaining);
            if self.repeating {
                self.value = self
                    .value
                    .wrapping_add(self.delta.wrapping_mul(take as i64));
            } else {
                for _ in 0..take {
                    self.skip_value()?;
                }
            }
            self.remaining -= take;
            count -= take;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned(bytes: Vec<u8>) -> RleDecoderV1<false> {
        RleDecoderV1::new(InputStream::new(bytes, "v1"), true, 4)
    }

    #[test]
    fn test_run_with_delta() {
        // run of 5 starting at 10 with delta 2, then literals [7, 300]
        let mut dec = unsigned(vec![0x02, 0x02, 0x0a, 0xfe, 0x07, 0xac, 0x02]);
        let mut out = [0i64; 7];
        dec.next(&mut out, None).unwrap();
        assert_eq!(out, [10, 12, 14, 16, 18, 7, 300]);
    }

    #[test]
    fn test_negative_delta_signed() {
        // run of 3 starting at -1 (zigzag 1) with delta -1
        let stream = InputStream::new(vec![0x00, 0xff, 0x01], "v1");
        let mut dec = RleDecoderV1::<true>::new(stream, true, 8);
        let mut out = [0i64; 3];
        dec.next(&mut out, None).unwrap();
        assert_eq!(out, [-1, -2, -3]);
    }

    #[test]
    fn test_skip_inside_run_and_literals() {
        let mut dec = unsigned(vec![0x02, 0x02, 0x0a, 0xfe, 0x07, 0xac, 0x02]);
        dec.skip(3).unwrap();
        let mut out = [0i64; 2];
        dec.next(&mut out, None).unwrap();
        assert_eq!(out, [16, 18]);
        dec.skip(1).unwrap();
        dec.next(&mut out[..1], None).unwrap();
        assert_eq!(out[0], 300);
    }

    #[test]
    fn test_fixed_width_values() {
        // literals [1, 258] as 4-byte little-endian integers
        let bytes = vec![0xfe, 1, 0, 0, 0, 2, 1, 0, 0];
        let mut dec = RleDecoderV1::<false>::new(InputStream::new(bytes, "v1"), false, 4);
        let mut out = [0i64; 2];
        dec.next(&mut out, None).unwrap();
        assert_eq!(out, [1, 258]);
    }

    #[test]
    fn test_truncated_stream() {
        let mut dec = unsigned(vec![0xfd, 0x01]);
        let mut out = [0i64; 3];
        assert!(dec.next(&mut out, None).is_err());
    }
}
