//! Integer column codecs for posting lists
//!
//! - sorted columns (document numbers): delta-encoded, bitpacked in blocks
//! - plain columns (offsets): variable-byte encoded

use std::io;

/// Values per bitpacked block
pub const BLOCK_SIZE: usize = 128;

/// Append `value` seven bits at a time, low group first; the final byte
/// carries the high bit
pub fn encode_vbyte(mut value: u32, output: &mut Vec<u8>) {
    while value >= 0x80 {
        output.push((value & 0x7F) as u8);
        value >>= 7;
    }
    output.push(value as u8 | 0x80);
}

/// Read one value written by [`encode_vbyte`], advancing `pos`
pub fn decode_vbyte(input: &[u8], pos: &mut usize) -> io::Result<u32> {
    let mut value: u32 = 0;
    for shift in (0..32).step_by(7) {
        let Some(&byte) = input.get(*pos) else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Truncated vbyte value",
            ));
        };
        *pos += 1;
        value |= ((byte & 0x7F) as u32) << shift;
        if byte & 0x80 != 0 {
            return Ok(value);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "Vbyte value wider than 32 bits",
    ))
}

/// Pack a block of integers with the minimum bit width for its largest value
pub fn bitpack_encode(values: &[u32], output: &mut Vec<u8>) {
    let max_val = match values.iter().copied().max() {
        Some(max) => max,
        None => {
            output.push(0);
            return;
        }
    };
    let bits_needed = if max_val == 0 {
        1
    } else {
        32 - max_val.leading_zeros()
    } as u8;

    output.push(bits_needed);

    let mut current_byte: u64 = 0;
    let mut bits_in_current = 0;

    for &value in values {
        current_byte |= (value as u64) << bits_in_current;
        bits_in_current += bits_needed as u32;

        while bits_in_current >= 8 {
            output.push(current_byte as u8);
            current_byte >>= 8;
            bits_in_current -= 8;
        }
    }

    if bits_in_current > 0 {
        output.push(current_byte as u8);
    }
}

/// Decode `count` bitpacked integers
pub fn bitpack_decode(input: &[u8], pos: &mut usize, count: usize) -> io::Result<Vec<u32>> {
    if *pos >= input.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Unexpected end of bitpack",
        ));
    }

    let bits_needed = input[*pos] as u32;
    *pos += 1;

    if bits_needed == 0 {
        return Ok(vec![0; count]);
    }
    if bits_needed > 32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Bitpack width too large",
        ));
    }

    let total_bits = count as u64 * bits_needed as u64;
    let bytes_needed = ((total_bits + 7) / 8) as usize;

    if *pos + bytes_needed > input.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Not enough bytes for bitpack",
        ));
    }

    let mut values = Vec::with_capacity(count);
    let mut current: u64 = 0;
    let mut bits_available = 0;
    let mask = (1u64 << bits_needed) - 1;

    for _ in 0..count {
        while bits_available < bits_needed {
            current |= (input[*pos] as u64) << bits_available;
            *pos += 1;
            bits_available += 8;
        }

        values.push((current & mask) as u32);
        current >>= bits_needed;
        bits_available -= bits_needed;
    }

    Ok(values)
}

/// Encode a non-decreasing column as bitpacked deltas
pub fn encode_sorted(values: &[u32], output: &mut Vec<u8>) {
    encode_vbyte(values.len() as u32, output);
    let mut prev = 0u32;
    for block in values.chunks(BLOCK_SIZE) {
        let deltas: Vec<u32> = block
            .iter()
            .map(|&v| {
                let delta = v.wrapping_sub(prev);
                prev = v;
                delta
            })
            .collect();
        bitpack_encode(&deltas, output);
    }
}

pub fn decode_sorted(input: &[u8], pos: &mut usize) -> io::Result<Vec<u32>> {
    let count = decode_vbyte(input, pos)? as usize;
    let mut values = Vec::with_capacity(count.min(input.len() * 8));
    let mut prev = 0u32;
    let mut remaining = count;
    while remaining > 0 {
        let n = remaining.min(BLOCK_SIZE);
        for delta in bitpack_decode(input, pos, n)? {
            prev = prev.wrapping_add(delta);
            values.push(prev);
        }
        remaining -= n;
    }
    Ok(values)
}

/// Encode a column of arbitrary integers
pub fn encode_plain(values: &[u32], output: &mut Vec<u8>) {
    encode_vbyte(values.len() as u32, output);
    for &v in values {
        encode_vbyte(v, output);
    }
}

pub fn decode_plain(input: &[u8], pos: &mut usize) -> io::Result<Vec<u32>> {
    let count = decode_vbyte(input, pos)? as usize;
    let mut values = Vec::with_capacity(count.min(input.len()));
    for _ in 0..count {
        values.push(decode_vbyte(input, pos)?);
    }
    Ok(values)
}
