//! Integer run-length decoders.

use strata_common::{Result, verify_arg};
use strata_format::stream::RleVersion;

use crate::{input_stream::InputStream, rle_v1::RleDecoderV1, rle_v2::RleDecoderV2};

/// Size in bytes of a 32-bit integer, the fixed width of length streams.
pub const INT_BYTE_SIZE: usize = 4;

/// Size in bytes of a 64-bit integer.
pub const LONG_BYTE_SIZE: usize = 8;

/// A stateful, forward-only cursor over a run-length encoded integer stream.
///
/// Decoders are not random access: every position must either be decoded or
/// skipped, in order.
pub trait IntDecoder: Send {
    /// Fills `out` with one value per position.
    ///
    /// When `non_null` is given, only positions flagged `true` consume a value
    /// from the stream; null positions are set to zero.
    fn next(&mut self, out: &mut [i64], non_null: Option<&[bool]>) -> Result<()>;

    /// Consumes `count` values without materializing them.
    fn skip(&mut self, count: u64) -> Result<()>;
}

/// Creates a run-length decoder over `stream`.
///
/// `SIGNED` selects zigzag (varints) or sign extension (fixed width) for the
/// decoded values. For version 1, `use_vints` chooses between base-128 varints
/// and little-endian integers of `byte_width` bytes. Version 2 carries its own
/// bit widths and ignores both.
///
/// # Errors
///
/// Returns `InvalidArgument` if `byte_width` is not within `1..=8`.
pub fn create_rle_decoder<const SIGNED: bool>(
    version: RleVersion,
    stream: InputStream,
    use_vints: bool,
    byte_width: usize,
) -> Result<Box<dyn IntDecoder>> {
    verify_arg!(byte_width, (1..=LONG_BYTE_SIZE).contains(&byte_width));
    log::trace!(
        "creating {version:?} decoder over '{}' (signed: {SIGNED}, vints: {use_vints})",
        stream.label()
    );
    Ok(match version {
        RleVersion::V1 => Box::new(RleDecoderV1::<SIGNED>::new(stream, use_vints, byte_width)),
        RleVersion::V2 => Box::new(RleDecoderV2::<SIGNED>::new(stream)),
    })
}

/// Shared `next` implementation for decoders that produce one value at a time.
pub(crate) fn fill_with<F>(
    out: &mut [i64],
    non_null: Option<&[bool]>,
    mut next_value: F,
) -> Result<()>
where
    F: FnMut() -> Result<i64>,
{
    match non_null {
        None => {
            for slot in out.iter_mut() {
                *slot = next_value()?;
            }
        }
        Some(non_null) => {
            debug_assert_eq!(non_null.len(), out.len());
            for (slot, &present) in out.iter_mut().zip(non_null) {
                *slot = if present { next_value()? } else { 0 };
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use strata_testkit::rle::encode_int_rle_v1;

    use super::*;

    #[test]
    fn test_rejects_invalid_byte_width() {
        let stream = InputStream::new(Vec::new(), "len");
        assert!(create_rle_decoder::<false>(RleVersion::V1, stream.clone(), true, 0).is_err());
        assert!(create_rle_decoder::<false>(RleVersion::V1, stream, true, 9).is_err());
    }

    #[test]
    fn test_dispatches_on_version() {
        let bytes = encode_int_rle_v1(&[4, 4, 4, 9], false, true, INT_BYTE_SIZE);
        let mut v1 = create_rle_decoder::<false>(
            RleVersion::V1,
            InputStream::new(bytes, "len"),
            true,
            INT_BYTE_SIZE,
        )
        .unwrap();
        let mut out = [0i64; 4];
        v1.next(&mut out, None).unwrap();
        assert_eq!(out, [4, 4, 4, 9]);

        // short repeat of five 10000 values
        let mut v2 = create_rle_decoder::<false>(
            RleVersion::V2,
            InputStream::new(vec![0x0a, 0x27, 0x10], "len"),
            true,
            INT_BYTE_SIZE,
        )
        .unwrap();
        let mut out = [0i64; 5];
        v2.next(&mut out, None).unwrap();
        assert_eq!(out, [10000; 5]);
    }

    #[test]
    fn test_random_v1_roundtrip_with_nulls() {
        let mut rng = fastrand::Rng::with_seed(7);
        for &(signed, use_vints, width) in &[
            (false, true, INT_BYTE_SIZE),
            (true, true, LONG_BYTE_SIZE),
            (false, false, INT_BYTE_SIZE),
            (true, false, 2),
        ] {
            let values: Vec<i64> = (0..500)
                .map(|i| match i % 7 {
                    0..=2 => 42,
                    3 => rng.i64(0..1000),
                    _ if signed => rng.i64(-30000..30000),
                    _ => rng.i64(0..30000),
                })
                .collect();
            let bytes = encode_int_rle_v1(&values, signed, use_vints, width);
            let mut non_null = Vec::new();
            let mut present = 0;
            while present < values.len() {
                let p = non_null.len() % 6 != 5;
                present += p as usize;
                non_null.push(p);
            }
            let stream = InputStream::new(bytes, "data");
            let mut decoder: Box<dyn IntDecoder> = if signed {
                create_rle_decoder::<true>(RleVersion::V1, stream, use_vints, width).unwrap()
            } else {
                create_rle_decoder::<false>(RleVersion::V1, stream, use_vints, width).unwrap()
            };

            let mut out = vec![-1i64; non_null.len()];
            decoder.next(&mut out, Some(&non_null)).unwrap();
            let mut expected = values.iter();
            for (slot, &p) in out.iter().zip(&non_null) {
                if p {
                    assert_eq!(*slot, *expected.next().unwrap());
                } else {
                    assert_eq!(*slot, 0);
                }
            }
            assert!(expected.next().is_none());
        }
    }
}
