//! Reference encoders for byte, boolean and integer (version 1) run-length streams.

const MIN_REPEAT: usize = 3;
const MAX_REPEAT: usize = 127 + MIN_REPEAT;
const MAX_LITERALS: usize = 128;

/// Encodes `values` as a byte run-length stream.
pub fn encode_byte_rle(values: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut literals = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let mut run = 1;
        while i + run < values.len() && run < MAX_REPEAT && values[i + run] == values[i] {
            run += 1;
        }
        if run >= MIN_REPEAT {
            flush_byte_literals(&mut out, &mut literals);
            out.push((run - MIN_REPEAT) as u8);
            out.push(values[i]);
            i += run;
        } else {
            literals.push(values[i]);
            if literals.len() == MAX_LITERALS {
                flush_byte_literals(&mut out, &mut literals);
            }
            i += 1;
        }
    }
    flush_byte_literals(&mut out, &mut literals);
    out
}

fn flush_byte_literals(out: &mut Vec<u8>, literals: &mut Vec<u8>) {
    if literals.is_empty() {
        return;
    }
    out.push((-(literals.len() as i32)) as u8);
    out.append(literals);
}

/// Encodes `values` as a boolean stream: flags packed most significant bit
/// first, padded with zero bits, then byte run-length encoded.
pub fn encode_boolean_rle(values: &[bool]) -> Vec<u8> {
    let bytes: Vec<u8> = values
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << (7 - i)))
        })
        .collect();
    encode_byte_rle(&bytes)
}

/// Encodes `values` as an integer run-length (version 1) stream.
///
/// With `use_vints` values are written as base-128 varints (zigzag encoded
/// when `signed`), otherwise as little-endian integers of `byte_width` bytes.
pub fn encode_int_rle_v1(values: &[i64], signed: bool, use_vints: bool, byte_width: usize) -> Vec<u8> {
    let write_value = |out: &mut Vec<u8>, value: i64| {
        if use_vints {
            let raw = if signed {
                ((value << 1) ^ (value >> 63)) as u64
            } else {
                value as u64
            };
            write_varint(out, raw);
        } else {
            out.extend_from_slice(&value.to_le_bytes()[..byte_width]);
        }
    };

    let mut out = Vec::new();
    let mut literals: Vec<i64> = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let (run, delta) = delta_run_at(values, i);
        if run >= MIN_REPEAT {
            flush_int_literals(&mut out, &mut literals, &write_value);
            out.push((run - MIN_REPEAT) as u8);
            out.push(delta as i8 as u8);
            write_value(&mut out, values[i]);
            i += run;
        } else {
            literals.push(values[i]);
            if literals.len() == MAX_LITERALS {
                flush_int_literals(&mut out, &mut literals, &write_value);
            }
            i += 1;
        }
    }
    flush_int_literals(&mut out, &mut literals, &write_value);
    out
}

/// Length of the constant-delta run starting at `start` and its delta.
fn delta_run_at(values: &[i64], start: usize) -> (usize, i64) {
    if start + 1 >= values.len() {
        return (1, 0);
    }
    let delta = match values[start + 1].checked_sub(values[start]) {
        Some(delta) if (i8::MIN as i64..=i8::MAX as i64).contains(&delta) => delta,
        _ => return (1, 0),
    };
    let mut run = 2;
    while start + run < values.len()
        && run < MAX_REPEAT
        && values[start + run].checked_sub(values[start + run - 1]) == Some(delta)
    {
        run += 1;
    }
    (run, delta)
}

fn flush_int_literals(
    out: &mut Vec<u8>,
    literals: &mut Vec<i64>,
    write_value: &impl Fn(&mut Vec<u8>, i64),
) {
    if literals.is_empty() {
        return;
    }
    out.push((-(literals.len() as i32)) as u8);
    for value in literals.drain(..) {
        write_value(out, value);
    }
}

/// Writes `value` as an unsigned base-128 varint.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_rle_layout() {
        assert_eq!(encode_byte_rle(&[7, 7, 7, 7, 7, 1, 2]), vec![0x02, 7, 0xfe, 1, 2]);
        assert_eq!(encode_byte_rle(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_boolean_packing() {
        let bits = [true, false, true, false, false, false, false, false, true, true];
        assert_eq!(encode_boolean_rle(&bits), vec![0xfe, 0b1010_0000, 0b1100_0000]);
    }

    #[test]
    fn test_int_rle_v1_layout() {
        assert_eq!(
            encode_int_rle_v1(&[10, 12, 14, 16, 18, 7, 300], false, true, 4),
            vec![0x02, 0x02, 0x0a, 0xfe, 0x07, 0xac, 0x02]
        );
        assert_eq!(
            encode_int_rle_v1(&[1, 258], false, false, 4),
            vec![0xfe, 1, 0, 0, 0, 2, 1, 0, 0]
        );
        assert_eq!(encode_int_rle_v1(&[-1, -2, -3], true, true, 8), vec![0x00, 0xff, 0x01]);
    }
}
