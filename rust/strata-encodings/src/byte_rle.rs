//! Byte run-length decoding.
//!
//! The stream is a sequence of groups, each introduced by a control byte `h`
//! read as a signed value:
//! - `h >= 0`: a run of `h + 3` copies of the byte that follows;
//! - `h < 0`: `-h` literal bytes follow.

use strata_common::Result;

use crate::input_stream::InputStream;

pub struct ByteRleDecoder {
    stream: InputStream,
    remaining: usize,
    repeating: bool,
    value: u8,
}

impl ByteRleDecoder {
    pub fn new(stream: InputStream) -> ByteRleDecoder {
        ByteRleDecoder {
            stream,
            remaining: 0,
            repeating: false,
            value: 0,
        }
    }

    pub fn label(&self) -> &str {
        self.stream.label()
    }

    fn read_header(&mut self) -> Result<()> {
        let header = self.stream.read_byte()? as i8;
        if header < 0 {
            self.remaining = (-(header as i32)) as usize;
            self.repeating = false;
        } else {
            self.remaining = header as usize + 3;
            self.repeating = true;
            self.value = self.stream.read_byte()?;
        }
        Ok(())
    }

    /// Decodes the next byte.
    pub fn next_byte(&mut self) -> Result<u8> {
        if self.remaining == 0 {
            self.read_header()?;
        }
        self.remaining -= 1;
        if self.repeating {
            Ok(self.value)
        } else {
            self.stream.read_byte()
        }
    }

    /// Fills `out` with one byte per position.
    ///
    /// When `non_null` is given, only positions flagged `true` consume a byte
    /// from the stream; the others are set to zero.
    pub fn next(&mut self, out: &mut [u8], non_null: Option<&[bool]>) -> Result<()> {
        match non_null {
            None => {
                for slot in out.iter_mut() {
                    *slot = self.next_byte()?;
                }
            }
            Some(non_null) => {
                debug_assert_eq!(non_null.len(), out.len());
                for (slot, &present) in out.iter_mut().zip(non_null) {
                    *slot = if present { self.next_byte()? } else { 0 };
                }
            }
        }
        Ok(())
    }

    /// Skips `count` bytes.
    pub fn skip(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            if self.remaining == 0 {
                self.read_header()?;
            }
            let take = count.min(self.remaining as u64) as usize;
            if !self.repeating {
                self.stream.skip_bytes(take)?;
            }
            self.remaining -= take;
            count -= take as u64;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(bytes: Vec<u8>) -> ByteRleDecoder {
        ByteRleDecoder::new(InputStream::new(bytes, "bytes"))
    }

    #[test]
    fn test_runs_and_literals() {
        // run of 5 x 0x07, then literals [1, 2]
        let mut dec = decoder(vec![0x02, 0x07, 0xfe, 0x01, 0x02]);
        let mut out = [0u8; 7];
        dec.next(&mut out, None).unwrap();
        assert_eq!(out, [7, 7, 7, 7, 7, 1, 2]);
        assert!(dec.next_byte().is_err());
    }

    #[test]
    fn test_skip_across_groups() {
        let mut dec = decoder(vec![0x02, 0x07, 0xfd, 0x01, 0x02, 0x03]);
        dec.skip(6).unwrap();
        assert_eq!(dec.next_byte().unwrap(), 2);
        assert_eq!(dec.next_byte().unwrap(), 3);
    }

    #[test]
    fn test_nulls_do_not_consume() {
        let mut dec = decoder(vec![0xfe, 0x0a, 0x0b]);
        let mut out = [0xffu8; 4];
        dec.next(&mut out, Some(&[false, true, false, true])).unwrap();
        assert_eq!(out, [0, 10, 0, 11]);
    }
}
