use strata_common::Result;

use crate::input_stream::InputStream;

/// Reads big-endian (most significant bit first) bit-packed values.
///
/// Packed runs always end on a byte boundary; a fresh `BitReader` is created
/// for each run, so the unused low bits of the last byte are discarded.
pub(crate) struct BitReader<'a> {
    stream: &'a mut InputStream,
    current: u8,
    bits_left: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(stream: &'a mut InputStream) -> BitReader<'a> {
        BitReader {
            stream,
            current: 0,
            bits_left: 0,
        }
    }

    /// Reads one value of `width` bits (at most 64).
    pub fn read(&mut self, width: u32) -> Result<u64> {
        debug_assert!(width <= 64);
        let mut result = 0u64;
        let mut needed = width;
        while needed > 0 {
            if self.bits_left == 0 {
                self.current = self.stream.read_byte()?;
                self.bits_left = 8;
            }
            let take = needed.min(self.bits_left);
            let shift = self.bits_left - take;
            let bits = (u64::from(self.current) >> shift) & ((1u64 << take) - 1);
            result = (result << take) | bits;
            self.bits_left -= take;
            needed -= take;
        }
        Ok(result)
    }

    pub fn read_into(&mut self, width: u32, out: &mut Vec<u64>, count: usize) -> Result<()> {
        out.reserve(count);
        for _ in 0..count {
            out.push(self.read(width)?);
        }
        Ok(())
    }
}
