//! Boolean streams: byte run-length encoded bytes holding eight flags each,
//! most significant bit first.

use strata_common::Result;

use crate::{byte_rle::ByteRleDecoder, input_stream::InputStream};

pub struct BooleanRleDecoder {
    bytes: ByteRleDecoder,
    current: u8,
    bits_left: u32,
}

impl BooleanRleDecoder {
    pub fn new(stream: InputStream) -> BooleanRleDecoder {
        BooleanRleDecoder {
            bytes: ByteRleDecoder::new(stream),
            current: 0,
            bits_left: 0,
        }
    }

    pub fn label(&self) -> &str {
        self.bytes.label()
    }

    pub fn next_bool(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            self.current = self.bytes.next_byte()?;
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        Ok((self.current >> self.bits_left) & 1 == 1)
    }

    /// Fills `out` with one flag per position.
    ///
    /// When `non_null` is given, only positions flagged `true` consume a bit;
    /// the others are set to `false`.
    pub fn next(&mut self, out: &mut [bool], non_null: Option<&[bool]>) -> Result<()> {
        match non_null {
            None => {
                for slot in out.iter_mut() {
                    *slot = self.next_bool()?;
                }
            }
            Some(non_null) => {
                debug_assert_eq!(non_null.len(), out.len());
                for (slot, &present) in out.iter_mut().zip(non_null) {
                    *slot = present && self.next_bool()?;
                }
            }
        }
        Ok(())
    }

    /// Decodes `count` flags into a new vector.
    pub fn next_vec(&mut self, count: usize) -> Result<Vec<bool>> {
        let mut out = vec![false; count];
        self.next(&mut out, None)?;
        Ok(out)
    }

    pub fn skip(&mut self, mut count: u64) -> Result<()> {
        let from_current = count.min(u64::from(self.bits_left));
        self.bits_left -= from_current as u32;
        count -= from_current;
        if count == 0 {
            return Ok(());
        }
        self.bytes.skip(count / 8)?;
        let tail = (count % 8) as u32;
        if tail > 0 {
            self.current = self.bytes.next_byte()?;
            self.bits_left = 8 - tail;
        }
        Ok(())
    }
}
