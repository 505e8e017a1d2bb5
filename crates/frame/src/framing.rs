//! Framing disciplines
//!
//! Three interchangeable ways of delimiting a payload bit sequence. Frames are
//! not self-describing: the deframer must be told which scheme built them.

use crate::{FrameError, Result};
use commsim_core::bits::{byte_to_bits, pack_byte, validate_bits, Bit, BYTE_BITS};
use commsim_core::schemes::FramingScheme;
use tracing::debug;

/// Frame boundary marker, `01111110`
pub const FLAG: u8 = 0x7E;

/// Byte-stuffing escape, `01111011`
pub const ESCAPE: u8 = 0x7B;

/// 8-bit prefix shared by both bit-stuffing substitutions, `01111101`
pub const STUFF_PREFIX: u8 = 0x7D;

/// Substitute for a payload FLAG: a zero inserted after five ones
pub const STUFFED_FLAG: [Bit; 9] = [0, 1, 1, 1, 1, 1, 0, 1, 0];

/// Substitute for a payload byte equal to [`STUFF_PREFIX`]
pub const STUFFED_PREFIX: [Bit; 9] = [0, 1, 1, 1, 1, 1, 0, 1, 1];

/// Number of ASCII digits in a length prefix
pub const LENGTH_PREFIX_DIGITS: usize = 5;

/// Largest payload, in bits, a length prefix can declare
pub const MAX_PREFIXED_BITS: usize = 99_999;

/// Generic framer trait
pub trait Framer {
    /// Wrap a payload into a frame
    fn frame(&self, payload: &[Bit]) -> Result<Vec<Bit>>;

    /// Strip framing metadata, returning the original payload
    fn deframe(&self, frame: &[Bit]) -> Result<Vec<Bit>>;

    /// Scheme implemented by this framer
    fn scheme(&self) -> FramingScheme;
}

/// Frame `payload` with the given scheme
pub fn frame(scheme: FramingScheme, payload: &[Bit]) -> Result<Vec<Bit>> {
    let framed = framer_for(scheme).frame(payload)?;
    debug!("{} framed {} payload bits into {} bits", scheme, payload.len(), framed.len());
    Ok(framed)
}

/// Undo [`frame`] for the given scheme
pub fn deframe(scheme: FramingScheme, frame: &[Bit]) -> Result<Vec<Bit>> {
    let payload = framer_for(scheme).deframe(frame)?;
    debug!("{} deframed {} bits into {} payload bits", scheme, frame.len(), payload.len());
    Ok(payload)
}

/// Get the framer implementing `scheme`
pub fn framer_for(scheme: FramingScheme) -> Box<dyn Framer> {
    match scheme {
        FramingScheme::LengthPrefix => Box::new(LengthPrefix),
        FramingScheme::ByteStuffing => Box::new(ByteStuffing),
        FramingScheme::BitStuffing => Box::new(BitStuffing),
    }
}

/// Length-prefix framing.
///
/// The payload bit count is written as a fixed-width, zero-padded run of
/// ASCII decimal digits ahead of the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthPrefix;

impl LengthPrefix {
    const PREFIX_BITS: usize = LENGTH_PREFIX_DIGITS * BYTE_BITS;
}

impl Framer for LengthPrefix {
    fn frame(&self, payload: &[Bit]) -> Result<Vec<Bit>> {
        if payload.len() > MAX_PREFIXED_BITS {
            return Err(FrameError::PayloadTooLong {
                bits: payload.len(),
                max: MAX_PREFIXED_BITS,
            });
        }

        let digits = format!("{:0width$}", payload.len(), width = LENGTH_PREFIX_DIGITS);
        let mut framed = Vec::with_capacity(Self::PREFIX_BITS + payload.len());
        for byte in digits.bytes() {
            framed.extend_from_slice(&byte_to_bits(byte));
        }
        framed.extend_from_slice(payload);
        Ok(framed)
    }

    fn deframe(&self, frame: &[Bit]) -> Result<Vec<Bit>> {
        validate_bits(frame)?;
        if frame.len() < Self::PREFIX_BITS {
            return Err(FrameError::Truncated {
                scheme: self.scheme(),
                required: Self::PREFIX_BITS,
                actual: frame.len(),
            });
        }

        let mut declared = 0usize;
        for (i, group) in frame[..Self::PREFIX_BITS].chunks(BYTE_BITS).enumerate() {
            let byte = pack_byte(group);
            if !byte.is_ascii_digit() {
                return Err(FrameError::InvalidLengthPrefix {
                    msg: format!("byte {:#04x} at position {} is not a decimal digit", byte, i),
                });
            }
            declared = declared * 10 + usize::from(byte - b'0');
        }

        let data = &frame[Self::PREFIX_BITS..];
        if data.len() != declared {
            return Err(FrameError::LengthMismatch {
                declared,
                actual: data.len(),
            });
        }

        Ok(data.to_vec())
    }

    fn scheme(&self) -> FramingScheme {
        FramingScheme::LengthPrefix
    }
}

/// Byte-stuffing framing.
///
/// `FLAG body FLAG`, where every byte-aligned payload byte equal to FLAG or
/// ESCAPE is preceded by an ESCAPE byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteStuffing;

impl Framer for ByteStuffing {
    fn frame(&self, payload: &[Bit]) -> Result<Vec<Bit>> {
        let flag = byte_to_bits(FLAG);
        let escape = byte_to_bits(ESCAPE);

        let mut framed = Vec::with_capacity(payload.len() + 2 * BYTE_BITS);
        framed.extend_from_slice(&flag);

        let chunks = payload.chunks_exact(BYTE_BITS);
        let tail = chunks.remainder();
        for chunk in chunks {
            let byte = pack_byte(chunk);
            if byte == FLAG || byte == ESCAPE {
                framed.extend_from_slice(&escape);
            }
            framed.extend_from_slice(chunk);
        }
        framed.extend_from_slice(tail);

        framed.extend_from_slice(&flag);
        Ok(framed)
    }

    fn deframe(&self, frame: &[Bit]) -> Result<Vec<Bit>> {
        let body = strip_markers(self.scheme(), frame)?;
        let mut payload = Vec::with_capacity(body.len());

        // One-shot latch: the byte after an ESCAPE is taken verbatim.
        let mut i = 0;
        while i + BYTE_BITS <= body.len() {
            let byte = pack_byte(&body[i..i + BYTE_BITS]);
            if byte == ESCAPE {
                let next = i + BYTE_BITS;
                if next + BYTE_BITS > body.len() {
                    return Err(FrameError::DanglingEscape {
                        scheme: self.scheme(),
                        offset: i + BYTE_BITS,
                    });
                }
                payload.extend_from_slice(&body[next..next + BYTE_BITS]);
                i = next + BYTE_BITS;
            } else if byte == FLAG {
                return Err(FrameError::UnescapedFlag {
                    scheme: self.scheme(),
                    offset: i + BYTE_BITS,
                });
            } else {
                payload.extend_from_slice(&body[i..i + BYTE_BITS]);
                i += BYTE_BITS;
            }
        }
        payload.extend_from_slice(&body[i..]);

        Ok(payload)
    }

    fn scheme(&self) -> FramingScheme {
        FramingScheme::ByteStuffing
    }
}

/// Bit-stuffing framing, character insertion variant.
///
/// `FLAG body FLAG`, where every byte-aligned payload byte equal to FLAG is
/// sent as [`STUFFED_FLAG`]. A payload byte equal to the substitution's 8-bit
/// prefix is sent as [`STUFFED_PREFIX`] so the ninth bit always tells the two
/// apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitStuffing;

impl Framer for BitStuffing {
    fn frame(&self, payload: &[Bit]) -> Result<Vec<Bit>> {
        let flag = byte_to_bits(FLAG);

        let mut framed = Vec::with_capacity(payload.len() + 2 * BYTE_BITS);
        framed.extend_from_slice(&flag);

        let chunks = payload.chunks_exact(BYTE_BITS);
        let tail = chunks.remainder();
        for chunk in chunks {
            match pack_byte(chunk) {
                FLAG => framed.extend_from_slice(&STUFFED_FLAG),
                STUFF_PREFIX => framed.extend_from_slice(&STUFFED_PREFIX),
                _ => framed.extend_from_slice(chunk),
            }
        }
        framed.extend_from_slice(tail);

        framed.extend_from_slice(&flag);
        Ok(framed)
    }

    fn deframe(&self, frame: &[Bit]) -> Result<Vec<Bit>> {
        let body = strip_markers(self.scheme(), frame)?;
        let mut payload = Vec::with_capacity(body.len());

        let mut i = 0;
        while i + BYTE_BITS <= body.len() {
            match pack_byte(&body[i..i + BYTE_BITS]) {
                STUFF_PREFIX => {
                    let selector = body.get(i + BYTE_BITS).copied().ok_or(
                        FrameError::IncompleteUnit {
                            scheme: self.scheme(),
                            offset: i + BYTE_BITS,
                        },
                    )?;
                    let original = if selector == 0 { FLAG } else { STUFF_PREFIX };
                    payload.extend_from_slice(&byte_to_bits(original));
                    i += STUFFED_FLAG.len();
                }
                FLAG => {
                    return Err(FrameError::UnescapedFlag {
                        scheme: self.scheme(),
                        offset: i + BYTE_BITS,
                    });
                }
                _ => {
                    payload.extend_from_slice(&body[i..i + BYTE_BITS]);
                    i += BYTE_BITS;
                }
            }
        }
        payload.extend_from_slice(&body[i..]);

        Ok(payload)
    }

    fn scheme(&self) -> FramingScheme {
        FramingScheme::BitStuffing
    }
}

/// Check both FLAG markers and return the body between them
fn strip_markers(scheme: FramingScheme, frame: &[Bit]) -> Result<&[Bit]> {
    validate_bits(frame)?;
    if frame.len() < 2 * BYTE_BITS {
        return Err(FrameError::Truncated {
            scheme,
            required: 2 * BYTE_BITS,
            actual: frame.len(),
        });
    }

    let end = frame.len() - BYTE_BITS;
    if pack_byte(&frame[..BYTE_BITS]) != FLAG {
        return Err(FrameError::MarkerMismatch {
            scheme,
            marker: "leading",
        });
    }
    if pack_byte(&frame[end..]) != FLAG {
        return Err(FrameError::MarkerMismatch {
            scheme,
            marker: "trailing",
        });
    }

    Ok(&frame[BYTE_BITS..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use commsim_core::bits::{bytes_to_bits, text_to_bits};
    use quickcheck_macros::quickcheck;

    /// Deterministic payload that hits FLAG, ESCAPE and the stuffing prefix
    fn payload(len: usize) -> Vec<Bit> {
        let mut bytes: Vec<u8> = vec![FLAG, ESCAPE, STUFF_PREFIX, 0x00, 0xFF];
        bytes.extend((0u16..200).map(|i| (i * 37 % 256) as u8));
        let bits = bytes_to_bits(&bytes);
        bits.into_iter().cycle().take(len).collect()
    }

    #[test]
    fn test_idempotence_all_schemes() {
        for scheme in FramingScheme::ALL {
            for len in [0usize, 8, 17, 800] {
                let bits = payload(len);
                let framed = frame(*scheme, &bits).unwrap();
                let recovered = deframe(*scheme, &framed).unwrap();
                assert_eq!(recovered, bits, "{} failed for {} bits", scheme, len);
                assert!(framed.len() > bits.len());
            }
        }
    }

    #[test]
    fn test_length_prefix_layout() {
        let bits = text_to_bits("Hi");
        let framed = LengthPrefix.frame(&bits).unwrap();
        assert_eq!(&framed[..40], text_to_bits("00016").as_slice());
        assert_eq!(&framed[40..], bits.as_slice());
    }

    #[test]
    fn test_length_prefix_mismatch() {
        let mut framed = LengthPrefix.frame(&text_to_bits("Hi")).unwrap();
        framed.pop();
        let err = LengthPrefix.deframe(&framed).unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { declared: 16, actual: 15 }));
    }

    #[test]
    fn test_length_prefix_rejects_non_digit() {
        let mut framed = LengthPrefix.frame(&[1, 0, 1]).unwrap();
        // Turn the first '0' (00110000) into 'p' (01110000)
        framed[1] = 1;
        let err = LengthPrefix.deframe(&framed).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLengthPrefix { .. }));
    }

    #[test]
    fn test_length_prefix_too_long() {
        let bits = vec![0; MAX_PREFIXED_BITS + 1];
        assert!(matches!(
            LengthPrefix.frame(&bits),
            Err(FrameError::PayloadTooLong { .. })
        ));
    }

    #[test]
    fn test_length_prefix_truncated() {
        let err = LengthPrefix.deframe(&[0; 12]).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { required: 40, actual: 12, .. }));
    }

    #[test]
    fn test_byte_stuffing_escapes_flag_and_escape() {
        let flag = byte_to_bits(FLAG).to_vec();
        let escape = byte_to_bits(ESCAPE).to_vec();

        let framed = ByteStuffing.frame(&flag).unwrap();
        assert_eq!(framed, [flag.clone(), escape.clone(), flag.clone(), flag.clone()].concat());

        let framed = ByteStuffing.frame(&escape).unwrap();
        assert_eq!(framed, [flag.clone(), escape.clone(), escape.clone(), flag.clone()].concat());
        assert_eq!(ByteStuffing.deframe(&framed).unwrap(), escape);
    }

    #[test]
    fn test_byte_stuffing_escaped_escape_then_flag() {
        let bits = bytes_to_bits(&[ESCAPE, FLAG, 0x41]);
        let framed = ByteStuffing.frame(&bits).unwrap();
        assert_eq!(framed.len(), (2 + 3 + 2) * 8);
        assert_eq!(ByteStuffing.deframe(&framed).unwrap(), bits);
    }

    #[test]
    fn test_byte_stuffing_marker_mismatch() {
        let mut framed = ByteStuffing.frame(&text_to_bits("A")).unwrap();
        framed[0] = 1;
        assert!(matches!(
            ByteStuffing.deframe(&framed),
            Err(FrameError::MarkerMismatch { marker: "leading", .. })
        ));

        let mut framed = ByteStuffing.frame(&text_to_bits("A")).unwrap();
        let last = framed.len() - 1;
        framed[last] = 1;
        assert!(matches!(
            ByteStuffing.deframe(&framed),
            Err(FrameError::MarkerMismatch { marker: "trailing", .. })
        ));
    }

    #[test]
    fn test_byte_stuffing_dangling_escape() {
        let frame = bytes_to_bits(&[FLAG, ESCAPE, FLAG]);
        assert!(matches!(
            ByteStuffing.deframe(&frame),
            Err(FrameError::DanglingEscape { offset: 8, .. })
        ));
    }

    #[test]
    fn test_byte_stuffing_unescaped_flag() {
        let frame = bytes_to_bits(&[FLAG, 0x41, FLAG, FLAG]);
        assert!(matches!(
            ByteStuffing.deframe(&frame),
            Err(FrameError::UnescapedFlag { offset: 16, .. })
        ));
    }

    #[test]
    fn test_bit_stuffing_substitutes_flag() {
        let flag = byte_to_bits(FLAG).to_vec();
        let framed = BitStuffing.frame(&flag).unwrap();
        assert_eq!(framed.len(), 8 + 9 + 8);
        assert_eq!(&framed[8..17], &STUFFED_FLAG);
        assert_eq!(BitStuffing.deframe(&framed).unwrap(), flag);
    }

    #[test]
    fn test_bit_stuffing_prefix_byte_is_not_mistaken_for_flag() {
        // 0x7D followed by a byte starting with 0 would look like a stuffed
        // FLAG if 0x7D went out unmodified.
        let bits = bytes_to_bits(&[STUFF_PREFIX, 0x41]);
        let framed = BitStuffing.frame(&bits).unwrap();
        assert_eq!(&framed[8..17], &STUFFED_PREFIX);
        assert_eq!(BitStuffing.deframe(&framed).unwrap(), bits);
    }

    #[test]
    fn test_bit_stuffing_incomplete_unit() {
        let frame = [byte_to_bits(FLAG), byte_to_bits(STUFF_PREFIX), byte_to_bits(FLAG)].concat();
        assert!(matches!(
            BitStuffing.deframe(&frame),
            Err(FrameError::IncompleteUnit { offset: 8, .. })
        ));
    }

    #[test]
    fn test_frame_too_short_for_markers() {
        assert!(matches!(
            BitStuffing.deframe(&[0, 1, 1]),
            Err(FrameError::Truncated { required: 16, .. })
        ));
    }

    #[test]
    fn test_framing_errors_are_classified() {
        let err = ByteStuffing.deframe(&[0; 16]).unwrap_err();
        assert_eq!(err.kind(), commsim_core::ErrorKind::FramingError);
    }

    #[quickcheck]
    fn prop_deframe_inverts_frame(raw: Vec<bool>) -> bool {
        let bits: Vec<Bit> = raw.into_iter().map(Bit::from).collect();
        FramingScheme::ALL.iter().all(|&scheme| {
            frame(scheme, &bits)
                .and_then(|f| deframe(scheme, &f))
                .map(|p| p == bits)
                .unwrap_or(false)
        })
    }
}
