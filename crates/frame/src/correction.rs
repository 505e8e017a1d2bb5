//! Forward error correction

use commsim_core::bits::{Bit, BYTE_BITS};
use commsim_core::schemes::CorrectionScheme;
use tracing::{debug, warn};

/// Error correction statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorStats {
    /// Groups with a nonzero syndrome that were repaired
    pub corrected_errors: usize,
    /// Groups with a nonzero syndrome
    pub detected_errors: usize,
    /// Groups whose syndrome points outside the codeword
    pub uncorrectable_errors: usize,
}

/// Hamming(12,8) single-error-correcting code.
///
/// Parity bits sit at the power-of-two positions 1, 2, 4 and 8 (1-based) of
/// each 12-bit codeword. Bits that do not fill a whole group pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingCode;

impl HammingCode {
    /// Codeword length
    pub const CODEWORD_BITS: usize = 12;

    /// 0-based codeword positions holding data bits d0..d7
    pub const DATA_POSITIONS: [usize; 8] = [2, 4, 5, 6, 8, 9, 10, 11];

    /// Positions covered by each parity bit p1, p2, p4, p8
    const COVERAGE: [&'static [usize]; 4] = [
        &[0, 2, 4, 6, 8, 10],
        &[1, 2, 5, 6, 9, 10],
        &[3, 4, 5, 6, 11],
        &[7, 8, 9, 10, 11],
    ];

    /// Encode a single byte of data bits into a codeword
    pub fn encode_group(d: &[Bit; 8]) -> [Bit; 12] {
        let p1 = d[0] ^ d[1] ^ d[3] ^ d[4] ^ d[6];
        let p2 = d[0] ^ d[2] ^ d[3] ^ d[5] ^ d[6];
        let p4 = d[1] ^ d[2] ^ d[3] ^ d[7];
        let p8 = d[4] ^ d[5] ^ d[6] ^ d[7];
        [p1, p2, d[0], p4, d[1], d[2], d[3], p8, d[4], d[5], d[6], d[7]]
    }

    /// Syndrome of a codeword, the 1-based position of a single flipped bit
    pub fn syndrome(codeword: &[Bit; 12]) -> usize {
        Self::COVERAGE
            .iter()
            .enumerate()
            .map(|(i, positions)| {
                let t = positions.iter().fold(0, |acc, &p| acc ^ codeword[p]);
                usize::from(t) << i
            })
            .sum()
    }

    /// Protect `bits`, one codeword per full byte
    pub fn encode(&self, bits: &[Bit]) -> Vec<Bit> {
        let chunks = bits.chunks_exact(BYTE_BITS);
        let tail = chunks.remainder();

        let mut coded = Vec::with_capacity(bits.len() / BYTE_BITS * Self::CODEWORD_BITS + tail.len());
        for chunk in chunks {
            let mut group = [0; BYTE_BITS];
            group.copy_from_slice(chunk);
            coded.extend_from_slice(&Self::encode_group(&group));
        }
        coded.extend_from_slice(tail);
        coded
    }

    /// Repair single-bit errors and strip parity bits
    pub fn decode(&self, bits: &[Bit]) -> Vec<Bit> {
        self.decode_with_stats(bits).0
    }

    /// Decode and report how many groups were repaired
    pub fn decode_with_stats(&self, bits: &[Bit]) -> (Vec<Bit>, ErrorStats) {
        let mut stats = ErrorStats::default();
        let chunks = bits.chunks_exact(Self::CODEWORD_BITS);
        let tail = chunks.remainder();

        let mut data = Vec::with_capacity(bits.len() / Self::CODEWORD_BITS * BYTE_BITS + tail.len());
        for (group, chunk) in chunks.enumerate() {
            let mut codeword = [0; 12];
            codeword.copy_from_slice(chunk);

            match Self::syndrome(&codeword) {
                0 => {}
                e if e <= Self::CODEWORD_BITS => {
                    codeword[e - 1] ^= 1;
                    stats.detected_errors += 1;
                    stats.corrected_errors += 1;
                    debug!("Hamming group {}: corrected bit {}", group, e);
                }
                e => {
                    stats.detected_errors += 1;
                    stats.uncorrectable_errors += 1;
                    warn!("Hamming group {}: syndrome {} outside the codeword", group, e);
                }
            }

            data.extend(Self::DATA_POSITIONS.iter().map(|&p| codeword[p]));
        }
        data.extend_from_slice(tail);

        (data, stats)
    }

    /// Parity bits added to a frame of `frame_len` bits
    pub fn overhead_bits(&self, frame_len: usize) -> usize {
        frame_len / BYTE_BITS * (Self::CODEWORD_BITS - BYTE_BITS)
    }
}

/// Apply the correction code for `scheme`
pub fn protect(scheme: CorrectionScheme, bits: &[Bit]) -> Vec<Bit> {
    match scheme {
        CorrectionScheme::None => bits.to_vec(),
        CorrectionScheme::Hamming => HammingCode.encode(bits),
    }
}

/// Parity bits `scheme` adds to `frame_len` bits
pub fn correction_overhead(scheme: CorrectionScheme, frame_len: usize) -> usize {
    match scheme {
        CorrectionScheme::None => 0,
        CorrectionScheme::Hamming => HammingCode.overhead_bits(frame_len),
    }
}

/// Undo [`protect`], repairing what the code can
pub fn correct(scheme: CorrectionScheme, bits: &[Bit]) -> (Vec<Bit>, ErrorStats) {
    match scheme {
        CorrectionScheme::None => (bits.to_vec(), ErrorStats::default()),
        CorrectionScheme::Hamming => HammingCode.decode_with_stats(bits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commsim_core::bits::text_to_bits;
    use commsim_core::channel::flip_bit;
    use quickcheck_macros::quickcheck;

    const BYTE: [Bit; 8] = [1, 0, 1, 1, 0, 0, 1, 0];

    #[test]
    fn test_hamming_layout() {
        let codeword = HammingCode::encode_group(&BYTE);
        // p1 = 1^0^1^0^1, p2 = 1^1^1^0^1, p4 = 0^1^1^0, p8 = 0^0^1^0
        assert_eq!(codeword, [1, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 0]);
        assert_eq!(HammingCode::syndrome(&codeword), 0);
    }

    #[test]
    fn test_hamming_corrects_every_position() {
        let coded = HammingCode.encode(&BYTE);
        for i in 0..HammingCode::CODEWORD_BITS {
            let corrupted = flip_bit(&coded, i).unwrap();
            let codeword: [Bit; 12] = corrupted[..].try_into().unwrap();
            assert_eq!(HammingCode::syndrome(&codeword), i + 1);

            let (data, stats) = HammingCode.decode_with_stats(&corrupted);
            assert_eq!(data, BYTE.to_vec(), "flip at position {}", i);
            assert_eq!(stats.corrected_errors, 1);
        }
    }

    #[test]
    fn test_hamming_one_error_per_group() {
        let bits = text_to_bits("abc");
        let mut coded = HammingCode.encode(&bits);
        coded[0] ^= 1;
        coded[12 + 7] ^= 1;
        coded[24 + 11] ^= 1;

        let (data, stats) = HammingCode.decode_with_stats(&coded);
        assert_eq!(data, bits);
        assert_eq!(stats.corrected_errors, 3);
        assert_eq!(stats.uncorrectable_errors, 0);
    }

    #[test]
    fn test_hamming_remainder_passes_through() {
        let bits = vec![1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0];
        let coded = HammingCode.encode(&bits);
        assert_eq!(coded.len(), 12 + 3);
        assert_eq!(&coded[12..], &[1, 1, 0]);
        assert_eq!(HammingCode.decode(&coded), bits);
    }

    #[test]
    fn test_hamming_out_of_range_syndrome() {
        // Flipping positions 5 and 8 (1-based) gives syndrome 13
        let mut coded = HammingCode.encode(&BYTE);
        coded[4] ^= 1;
        coded[7] ^= 1;
        let codeword: [Bit; 12] = coded[..].try_into().unwrap();
        assert_eq!(HammingCode::syndrome(&codeword), 13);

        let (data, stats) = HammingCode.decode_with_stats(&coded);
        assert_eq!(data.len(), 8);
        assert_eq!(stats.uncorrectable_errors, 1);
        assert_eq!(stats.corrected_errors, 0);
    }

    #[test]
    fn test_overhead() {
        assert_eq!(HammingCode.overhead_bits(16), 8);
        assert_eq!(HammingCode.overhead_bits(7), 0);
        assert_eq!(correction_overhead(CorrectionScheme::Hamming, 20), 8);
        assert_eq!(correction_overhead(CorrectionScheme::None, 20), 0);
    }

    #[quickcheck]
    fn prop_hamming_roundtrip(raw: Vec<bool>) -> bool {
        let bits: Vec<Bit> = raw.into_iter().map(Bit::from).collect();
        let (data, stats) = correct(CorrectionScheme::Hamming, &protect(CorrectionScheme::Hamming, &bits));
        data == bits && stats == ErrorStats::default()
    }
}
