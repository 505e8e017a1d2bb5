//! Error detection codes

use crate::{FrameError, Result};
use commsim_core::bits::{validate_bits, Bit};
use commsim_core::schemes::DetectionScheme;
use tracing::debug;

/// Generic error detection trait
pub trait ErrorDetector {
    /// Append check bits to a frame
    fn encode(&self, frame: &[Bit]) -> Vec<Bit>;

    /// Verify a codeword and strip its check bits
    fn decode(&self, codeword: &[Bit]) -> Result<Vec<Bit>>;

    /// Number of check bits appended to a frame of `frame_len` bits
    fn overhead_bits(&self, frame_len: usize) -> usize;
}

/// Append check bits for `scheme`
pub fn add_check(scheme: DetectionScheme, frame: &[Bit]) -> Vec<Bit> {
    let coded = match scheme {
        DetectionScheme::None => frame.to_vec(),
        DetectionScheme::Parity => ParityCheck.encode(frame),
        DetectionScheme::Crc => Crc::default().encode(frame),
    };
    debug!("{} check added {} bits", scheme, coded.len() - frame.len());
    coded
}

/// Verify and strip check bits for `scheme`
pub fn verify_check(scheme: DetectionScheme, codeword: &[Bit]) -> Result<Vec<Bit>> {
    match scheme {
        DetectionScheme::None => Ok(codeword.to_vec()),
        DetectionScheme::Parity => ParityCheck.decode(codeword),
        DetectionScheme::Crc => Crc::default().decode(codeword),
    }
}

/// Check bits `scheme` appends to a frame of `frame_len` bits
pub fn check_overhead(scheme: DetectionScheme, frame_len: usize) -> usize {
    match scheme {
        DetectionScheme::None => 0,
        DetectionScheme::Parity => ParityCheck.overhead_bits(frame_len),
        DetectionScheme::Crc => Crc::default().overhead_bits(frame_len),
    }
}

/// Even parity over the whole frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityCheck;

impl ParityCheck {
    /// Parity of a bit sequence, 1 when the count of ones is odd
    pub fn parity(bits: &[Bit]) -> Bit {
        bits.iter().fold(0, |acc, &b| acc ^ (b & 1))
    }
}

impl ErrorDetector for ParityCheck {
    fn encode(&self, frame: &[Bit]) -> Vec<Bit> {
        let mut coded = Vec::with_capacity(frame.len() + 1);
        coded.extend_from_slice(frame);
        coded.push(Self::parity(frame));
        coded
    }

    fn decode(&self, codeword: &[Bit]) -> Result<Vec<Bit>> {
        validate_bits(codeword)?;
        let Some((_, data)) = codeword.split_last() else {
            return Err(FrameError::CodewordTooShort {
                check: DetectionScheme::Parity,
                len: 0,
            });
        };

        if Self::parity(codeword) != 0 {
            return Err(FrameError::Transmission {
                check: DetectionScheme::Parity,
            });
        }

        Ok(data.to_vec())
    }

    fn overhead_bits(&self, _frame_len: usize) -> usize {
        1
    }
}

/// Cyclic redundancy check by GF(2) long division
#[derive(Debug, Clone)]
pub struct Crc {
    generator: Vec<Bit>,
}

impl Crc {
    /// Generator polynomial x^3 + x^2 + 1
    pub const GENERATOR: [Bit; 4] = [1, 1, 0, 1];

    /// Width of the remainder in bits
    pub fn width(&self) -> usize {
        self.generator.len().saturating_sub(1)
    }

    /// Remainder of `bits` divided by the generator.
    ///
    /// The division runs over the first `len - width` positions, so callers
    /// computing a fresh checksum append `width` zeros first.
    pub fn remainder(&self, bits: &[Bit]) -> Vec<Bit> {
        let width = self.width();
        let mut work = bits.to_vec();

        for i in 0..bits.len().saturating_sub(width) {
            if work[i] == 1 {
                for (w, &g) in work[i..].iter_mut().zip(&self.generator) {
                    *w ^= g;
                }
            }
        }

        work.split_off(bits.len().saturating_sub(width))
    }
}

impl Default for Crc {
    fn default() -> Self {
        Self {
            generator: Self::GENERATOR.to_vec(),
        }
    }
}

impl ErrorDetector for Crc {
    fn encode(&self, frame: &[Bit]) -> Vec<Bit> {
        let mut dividend = frame.to_vec();
        dividend.resize(frame.len() + self.width(), 0);
        let remainder = self.remainder(&dividend);

        let mut coded = frame.to_vec();
        coded.extend_from_slice(&remainder);
        coded
    }

    fn decode(&self, codeword: &[Bit]) -> Result<Vec<Bit>> {
        validate_bits(codeword)?;
        let width = self.width();
        if codeword.len() < width {
            return Err(FrameError::CodewordTooShort {
                check: DetectionScheme::Crc,
                len: codeword.len(),
            });
        }

        if self.remainder(codeword).iter().any(|&b| b != 0) {
            return Err(FrameError::Transmission {
                check: DetectionScheme::Crc,
            });
        }

        Ok(codeword[..codeword.len() - width].to_vec())
    }

    fn overhead_bits(&self, _frame_len: usize) -> usize {
        self.width()
    }
}
