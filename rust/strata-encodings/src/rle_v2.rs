//! Integer run-length encoding, version 2.
//!
//! The two most significant bits of a run's first header byte select one of
//! four sub-encodings:
//!
//! ```text
//! 00 SHORT_REPEAT  3..=10 copies of one value stored in 1..=8 big-endian bytes
//! 01 DIRECT        up to 512 bit-packed values
//! 10 PATCHED_BASE  bit-packed offsets from a base value, with a patch list
//!                  supplying the high bits of outliers
//! 11 DELTA         a base value, a delta base and bit-packed delta magnitudes
//! ```
//!
//! Signed streams zigzag encode values in SHORT_REPEAT and DIRECT runs and the
//! base value of DELTA runs. PATCHED_BASE stores its base in sign-magnitude form.

use strata_common::{Result, error::Error, verify_data};

use crate::{
    bit_reader::BitReader,
    input_stream::InputStream,
    int_decoder::{IntDecoder, fill_with},
    varint::{read_fixed_be, read_vi64, read_vu64, zigzag_decode},
};

pub(crate) struct RleDecoderV2<const SIGNED: bool> {
    stream: InputStream,
    literals: Vec<i64>,
    pos: usize,
}

/// Decodes the 5-bit width code used in run headers.
fn decode_bit_width(code: u8) -> u32 {
    match code {
        0..=23 => u32::from(code) + 1,
        24 => 26,
        25 => 28,
        26 => 30,
        27 => 32,
        28 => 40,
        29 => 48,
        30 => 56,
        _ => 64,
    }
}

/// Rounds `bits` up to the nearest width the encoder can emit.
fn closest_fixed_bits(bits: u32) -> u32 {
    match bits {
        0 => 1,
        1..=24 => bits,
        25..=26 => 26,
        27..=28 => 28,
        29..=30 => 30,
        31..=32 => 32,
        33..=40 => 40,
        41..=48 => 48,
        49..=56 => 56,
        _ => 64,
    }
}

impl<const SIGNED: bool> RleDecoderV2<SIGNED> {
    pub fn new(stream: InputStream) -> Self {
        RleDecoderV2 {
            stream,
            literals: Vec::new(),
            pos: 0,
        }
    }

    #[inline]
    fn decode_signed(value: u64) -> i64 {
        if SIGNED {
            zigzag_decode(value)
        } else {
            value as i64
        }
    }

    fn next_value(&mut self) -> Result<i64> {
        if self.pos == self.literals.len() {
            self.read_run()?;
        }
        let value = self.literals[self.pos];
        self.pos += 1;
        Ok(value)
    }

    fn read_run(&mut self) -> Result<()> {
        self.literals.clear();
        self.pos = 0;
        let header = self.stream.read_byte()?;
        match header >> 6 {
            0 => self.read_short_repeat(header)?,
            1 => self.read_direct(header)?,
            2 => self.read_patched_base(header)?,
            _ => self.read_delta(header)?,
        }
        verify_data!(run_length, !self.literals.is_empty());
        Ok(())
    }

    /// Reads the 9-bit run length spread over the header's low bit and the next byte.
    fn read_run_length(&mut self, header: u8) -> Result<usize> {
        let low = self.stream.read_byte()?;
        Ok(((usize::from(header & 1) << 8) | usize::from(low)) + 1)
    }

    fn read_short_repeat(&mut self, header: u8) -> Result<()> {
        let width = usize::from((header >> 3) & 0x07) + 1;
        let count = usize::from(header & 0x07) + 3;
        let value = Self::decode_signed(read_fixed_be(&mut self.stream, width)?);
        self.literals.resize(count, value);
        Ok(())
    }

    fn read_direct(&mut self, header: u8) -> Result<()> {
        let width = decode_bit_width((header >> 1) & 0x1f);
        let len = self.read_run_length(header)?;
        let mut packed = Vec::new();
        BitReader::new(&mut self.stream).read_into(width, &mut packed, len)?;
        self.literals
            .extend(packed.into_iter().map(Self::decode_signed));
        Ok(())
    }

    fn read_patched_base(&mut self, header: u8) -> Result<()> {
        let width = decode_bit_width((header >> 1) & 0x1f);
        let len = self.read_run_length(header)?;
        let third = self.stream.read_byte()?;
        let base_width = usize::from((third >> 5) & 0x07) + 1;
        let patch_width = decode_bit_width(third & 0x1f);
        let fourth = self.stream.read_byte()?;
        let gap_width = u32::from((fourth >> 5) & 0x07) + 1;
        let patch_count = usize::from(fourth & 0x1f);
        verify_data!(patch_width, width + patch_width <= 64);

        let raw_base = read_fixed_be(&mut self.stream, base_width)?;
        let sign_bit = 1u64 << (base_width * 8 - 1);
        let base = if raw_base & sign_bit != 0 {
            -((raw_base & !sign_bit) as i64)
        } else {
            raw_base as i64
        };

        let mut values = Vec::new();
        BitReader::new(&mut self.stream).read_into(width, &mut values, len)?;
        let mut patches = Vec::new();
        BitReader::new(&mut self.stream).read_into(
            closest_fixed_bits(gap_width + patch_width),
            &mut patches,
            patch_count,
        )?;

        let patch_mask = if patch_width == 64 {
            u64::MAX
        } else {
            (1u64 << patch_width) - 1
        };
        let mut index = 0usize;
        for entry in patches {
            index += (entry >> patch_width) as usize;
            let patch = entry & patch_mask;
            if patch == 0 {
                // gap-only entry
                continue;
            }
            let slot = values.get_mut(index).ok_or_else(|| {
                Error::invalid_format(format!(
                    "stream '{}': patch index {index} beyond run of {len}",
                    self.stream.label()
                ))
            })?;
            *slot |= patch << width;
        }
        self.literals
            .extend(values.into_iter().map(|v| base.wrapping_add(v as i64)));
        Ok(())
    }

    fn read_delta(&mut self, header: u8) -> Result<()> {
        let code = (header >> 1) & 0x1f;
        let width = if code == 0 { 0 } else { decode_bit_width(code) };
        let len = self.read_run_length(header)?;
        let base = if SIGNED {
            read_vi64(&mut self.stream)?
        } else {
            read_vu64(&mut self.stream)? as i64
        };
        let delta_base = read_vi64(&mut self.stream)?;

        self.literals.reserve(len);
        self.literals.push(base);
        if width == 0 {
            let mut value = base;
            for _ in 1..len {
                value = value.wrapping_add(delta_base);
                self.literals.push(value);
            }
            return Ok(());
        }

        verify_data!(len, len >= 2);
        let mut value = base.wrapping_add(delta_base);
        self.literals.push(value);
        let mut deltas = Vec::new();
        BitReader::new(&mut self.stream).read_into(width, &mut deltas, len - 2)?;
        for delta in deltas {
            value = if delta_base < 0 {
                value.wrapping_sub(delta as i64)
            } else {
                value.wrapping_add(delta as i64)
            };
            self.literals.push(value);
        }
        Ok(())
    }
}

impl<const SIGNED: bool> IntDecoder for RleDecoderV2<SIGNED> {
    fn next(&mut self, out: &mut [i64], non_null: Option<&[bool]>) -> Result<()> {
        fill_with(out, non_null, || self.next_value())
    }

    fn skip(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            if self.pos == self.literals.len() {
                self.read_run()?;
            }
            let take = count.min((self.literals.len() - self.pos) as u64);
            self.pos += take as usize;
            count -= take;
        }
        Ok(())
    }
}
