//! Base-128 varints, zigzag and fixed-width integer helpers.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use strata_common::{Result, error::Error};

use crate::input_stream::InputStream;

/// Reads an unsigned base-128 varint (least significant group first).
pub fn read_vu64(stream: &mut InputStream) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = stream.read_byte()?;
        if shift >= 64 {
            return Err(Error::invalid_format(format!(
                "stream '{}': varint longer than 10 bytes",
                stream.label()
            )));
        }
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Reads a zigzag encoded signed varint.
pub fn read_vi64(stream: &mut InputStream) -> Result<i64> {
    read_vu64(stream).map(zigzag_decode)
}

/// Skips over one varint without decoding it.
pub fn skip_varint(stream: &mut InputStream) -> Result<()> {
    while stream.read_byte()? & 0x80 != 0 {}
    Ok(())
}

#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Reads a little-endian integer of `width` bytes (1 to 8).
///
/// With `signed`, values narrower than 8 bytes are sign-extended.
pub fn read_fixed_le(stream: &mut InputStream, width: usize, signed: bool) -> Result<i64> {
    let bytes = stream.read_bytes(width)?;
    Ok(if signed {
        LittleEndian::read_int(bytes, width)
    } else {
        LittleEndian::read_uint(bytes, width) as i64
    })
}

/// Reads an unsigned big-endian integer of `width` bytes (1 to 8).
pub fn read_fixed_be(stream: &mut InputStream, width: usize) -> Result<u64> {
    let bytes = stream.read_bytes(width)?;
    Ok(BigEndian::read_uint(bytes, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varints() {
        let mut stream = InputStream::new(vec![0x96u8, 0x01, 0x03, 0x7f, 0x80, 0x01], "v");
        assert_eq!(read_vu64(&mut stream).unwrap(), 150);
        assert_eq!(read_vi64(&mut stream).unwrap(), -2);
        assert_eq!(read_vi64(&mut stream).unwrap(), -64);
        assert_eq!(read_vu64(&mut stream).unwrap(), 128);
        assert!(read_vu64(&mut stream).is_err());
    }

    #[test]
    fn test_overlong_varint_is_rejected() {
        let mut stream = InputStream::new(vec![0xffu8; 11], "v");
        assert!(read_vu64(&mut stream).is_err());
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_decode(0), 0);
        assert_eq!(zigzag_decode(1), -1);
        assert_eq!(zigzag_decode(2), 1);
        assert_eq!(zigzag_decode(u64::MAX), i64::MIN);
    }

    #[test]
    fn test_fixed_width() {
        let mut stream = InputStream::new(vec![0xfeu8, 0xff, 0xfe, 0xff, 0x01, 0x02], "f");
        assert_eq!(read_fixed_le(&mut stream, 2, true).unwrap(), -2);
        assert_eq!(read_fixed_le(&mut stream, 2, false).unwrap(), 0xfffe);
        assert_eq!(read_fixed_be(&mut stream, 2).unwrap(), 0x0102);
    }

    #[test]
    fn test_skip_varint() {
        let mut stream = InputStream::new(vec![0x96u8, 0x01, 0x05], "v");
        skip_varint(&mut stream).unwrap();
        assert_eq!(read_vu64(&mut stream).unwrap(), 5);
    }
}
