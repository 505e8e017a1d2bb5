//! Baseband line codes
//!
//! Each code maps logical bits to discrete levels. Decoding is the exact
//! inverse and rejects any level outside the code's alphabet.

use crate::{ModemError, Result};
use commsim_core::bits::{validate_bits, Bit, Level};
use commsim_core::schemes::LineCode;
use tracing::debug;

/// Encode bits into line levels
pub fn encode(code: LineCode, bits: &[Bit]) -> Result<Vec<Level>> {
    validate_bits(bits)?;

    let levels = match code {
        LineCode::NrzPolar => bits.iter().map(|&b| if b == 1 { 1 } else { -1 }).collect(),
        LineCode::Manchester => bits
            .iter()
            .flat_map(|&b| [b as Level, (b ^ 1) as Level])
            .collect(),
        LineCode::Bipolar => {
            let mut levels = Vec::with_capacity(bits.len());
            let mut polarity: Level = 1;
            for &b in bits {
                if b == 1 {
                    levels.push(polarity);
                    polarity = -polarity;
                } else {
                    levels.push(0);
                }
            }
            levels
        }
    };

    debug!("{} coded {} bits into {} levels", code, bits.len(), levels.len());
    Ok(levels)
}

/// Decode line levels back into bits
pub fn decode(code: LineCode, levels: &[Level]) -> Result<Vec<Bit>> {
    check_alphabet(code, levels).map_err(|e| match e {
        ModemError::LevelOutOfAlphabet { level, index, .. } => ModemError::MalformedLineSignal {
            line_code: code,
            msg: format!("level {} at index {} is outside the alphabet", level, index),
        },
        other => other,
    })?;

    let bits = match code {
        LineCode::NrzPolar => levels.iter().map(|&l| Bit::from(l > 0)).collect(),
        LineCode::Manchester => {
            if levels.len() % 2 != 0 {
                return Err(ModemError::MalformedLineSignal {
                    line_code: code,
                    msg: format!("odd level count {}", levels.len()),
                });
            }
            levels
                .chunks_exact(2)
                .enumerate()
                .map(|(i, pair)| match pair[0].cmp(&pair[1]) {
                    std::cmp::Ordering::Greater => Ok(1),
                    std::cmp::Ordering::Less => Ok(0),
                    std::cmp::Ordering::Equal => Err(ModemError::MalformedLineSignal {
                        line_code: code,
                        msg: format!("bit {} has no mid-bit transition", i),
                    }),
                })
                .collect::<Result<Vec<Bit>>>()?
        }
        LineCode::Bipolar => levels.iter().map(|&l| Bit::from(l != 0)).collect(),
    };

    Ok(bits)
}

/// Check every level against the code's alphabet
pub fn check_alphabet(code: LineCode, levels: &[Level]) -> Result<()> {
    let alphabet = code.alphabet();
    match levels.iter().position(|l| !alphabet.contains(l)) {
        Some(index) => Err(ModemError::LevelOutOfAlphabet {
            line_code: code,
            level: levels[index],
            index,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commsim_core::ErrorKind;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_nrz_polar() {
        assert_eq!(encode(LineCode::NrzPolar, &[1, 0, 1]).unwrap(), vec![1, -1, 1]);
        assert_eq!(decode(LineCode::NrzPolar, &[1, -1, 1]).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_manchester() {
        let levels = encode(LineCode::Manchester, &[1, 0]).unwrap();
        assert_eq!(levels, vec![1, 0, 0, 1]);
        assert_eq!(decode(LineCode::Manchester, &levels).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_manchester_malformed() {
        let err = decode(LineCode::Manchester, &[1, 0, 1]).unwrap_err();
        assert!(matches!(err, ModemError::MalformedLineSignal { .. }));

        let err = decode(LineCode::Manchester, &[1, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DemodulationError);
    }

    #[test]
    fn test_bipolar_alternates_marks() {
        let levels = encode(LineCode::Bipolar, &[1, 0, 1, 1, 0, 1]).unwrap();
        assert_eq!(levels, vec![1, 0, -1, 1, 0, -1]);
        assert_eq!(decode(LineCode::Bipolar, &levels).unwrap(), vec![1, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn test_polarity_does_not_leak_between_calls() {
        assert_eq!(encode(LineCode::Bipolar, &[1]).unwrap(), vec![1]);
        assert_eq!(encode(LineCode::Bipolar, &[1]).unwrap(), vec![1]);
    }

    #[test]
    fn test_levels_outside_alphabet() {
        assert!(decode(LineCode::NrzPolar, &[1, 0]).is_err());
        assert!(decode(LineCode::Manchester, &[-1, 1]).is_err());
        assert!(check_alphabet(LineCode::Bipolar, &[1, 0, -1]).is_ok());
        assert!(matches!(
            check_alphabet(LineCode::Bipolar, &[1, 2]),
            Err(ModemError::LevelOutOfAlphabet { level: 2, index: 1, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_non_binary() {
        assert_eq!(
            encode(LineCode::NrzPolar, &[1, 2]).unwrap_err().kind(),
            ErrorKind::DecodeError
        );
    }

    #[quickcheck]
    fn prop_line_roundtrip(raw: Vec<bool>) -> bool {
        let bits: Vec<Bit> = raw.into_iter().map(Bit::from).collect();
        LineCode::ALL.iter().all(|&code| {
            let levels = encode(code, &bits).unwrap();
            levels.len() == bits.len() * code.levels_per_bit()
                && decode(code, &levels).unwrap() == bits
        })
    }
}
