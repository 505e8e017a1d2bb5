//! Bit sequences and the text ⇄ bit codec
//!
//! Bits travel through the stack as plain `u8` values holding 0 or 1, one per
//! element, in transmission order. Bytes are always expanded MSB first.

use crate::{CoreError, Result};

/// A single binary digit (0 or 1)
pub type Bit = u8;

/// A line level once a bit has been line-coded (-1, 0 or +1)
pub type Level = i8;

/// Number of bits in one byte group
pub const BYTE_BITS: usize = 8;

/// Expand one byte into 8 bits, MSB first
pub fn byte_to_bits(byte: u8) -> [Bit; BYTE_BITS] {
    let mut bits = [0; BYTE_BITS];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (7 - i)) & 1;
    }
    bits
}

/// Expand a byte slice into bits, MSB first
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<Bit> {
    let mut bits = Vec::with_capacity(bytes.len() * BYTE_BITS);
    for &byte in bytes {
        bits.extend_from_slice(&byte_to_bits(byte));
    }
    bits
}

/// Pack exactly 8 bits into a byte without validation.
///
/// Callers that hold untrusted bits should go through [`bits_to_bytes`].
pub fn pack_byte(bits: &[Bit]) -> u8 {
    bits.iter()
        .take(BYTE_BITS)
        .fold(0u8, |acc, &bit| (acc << 1) | (bit & 1))
}

/// Group bits into bytes, MSB first
pub fn bits_to_bytes(bits: &[Bit]) -> Result<Vec<u8>> {
    if bits.len() % BYTE_BITS != 0 {
        return Err(CoreError::UnalignedBits { count: bits.len() });
    }
    validate_bits(bits)?;

    Ok(bits.chunks(BYTE_BITS).map(pack_byte).collect())
}

/// Check that every element is 0 or 1
pub fn validate_bits(bits: &[Bit]) -> Result<()> {
    match bits.iter().position(|&b| b > 1) {
        Some(position) => Err(CoreError::InvalidBit {
            value: bits[position],
            position,
        }),
        None => Ok(()),
    }
}

/// Encode text as its UTF-8 bytes, 8 bits per byte
pub fn text_to_bits(text: &str) -> Vec<Bit> {
    bytes_to_bits(text.as_bytes())
}

/// Decode an 8-bit-per-byte sequence back into text
pub fn bits_to_text(bits: &[Bit]) -> Result<String> {
    let bytes = bits_to_bytes(bits)?;
    Ok(String::from_utf8(bytes)?)
}

/// Render bits as space-separated 8-bit groups, e.g. `01001000 01101001`
pub fn format_bits(bits: &[Bit]) -> String {
    bits.chunks(BYTE_BITS)
        .map(|group| group.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_text_to_bits_hi() {
        let bits = text_to_bits("Hi");
        assert_eq!(
            bits,
            vec![0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 1, 0, 1, 0, 0, 1]
        );
        assert_eq!(format_bits(&bits), "01001000 01101001");
    }

    #[test]
    fn test_bits_to_text_rejects_unaligned() {
        let result = bits_to_text(&[0, 1, 0]);
        assert!(matches!(result, Err(CoreError::UnalignedBits { count: 3 })));
    }

    #[test]
    fn test_bits_to_text_rejects_invalid_utf8() {
        // 0xFF is never valid in UTF-8
        let bits = bytes_to_bits(&[0xFF]);
        let err = bits_to_text(&bits).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DecodeError);
    }

    #[test]
    fn test_invalid_bit_value() {
        let err = bits_to_bytes(&[0, 1, 2, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidBit { value: 2, position: 2 }));
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "ação";
        let bits = text_to_bits(text);
        assert_eq!(bits.len(), text.len() * 8);
        assert_eq!(bits_to_text(&bits).unwrap(), text);
    }

    #[quickcheck]
    fn prop_text_roundtrip(text: String) -> bool {
        bits_to_text(&text_to_bits(&text)).map(|t| t == text).unwrap_or(false)
    }
}
