//! Hex transport encoding for WKB buffers
//!
//! Output is upper-case; input may use either case.

use crate::error::{GeometryError, Result};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encode bytes as two hex digits each, most significant nibble first
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
    }
    out
}

/// Decode hex text produced by [`to_hex`] (or any even-length hex string)
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(GeometryError::Format(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }

    digits
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let hi = nibble(pair[0], i * 2)?;
            let lo = nibble(pair[1], i * 2 + 1)?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn nibble(digit: u8, position: usize) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(GeometryError::Format(format!(
            "invalid hex character {:?} at position {}",
            digit as char, position
        ))),
    }
}
