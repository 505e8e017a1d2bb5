//! Scheme selectors for every stage of the stack
//!
//! Each stage is configured by a closed enum chosen once per run. Names parse
//! case-insensitively from either the short form (`length-prefix`) or the
//! display form (`Length-Prefix`); anything else is a configuration error.

use crate::bits::Level;
use crate::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! scheme_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $short:literal, $display:literal $(| $alias:literal)*; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Short machine-friendly name
            pub fn name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $short, )+
                }
            }

            /// Human-readable name
            pub fn display_name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $display, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim().to_ascii_lowercase();
                $(
                    if wanted == $short
                        || wanted == $display.to_ascii_lowercase()
                        $(|| wanted == $alias)*
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(CoreError::UnknownScheme {
                    kind: $kind,
                    name: s.to_string(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

scheme_enum! {
    /// How a flat bit sequence is delimited into a frame
    FramingScheme, "framing" {
        /// Bit length as ASCII decimal digits in front of the payload
        LengthPrefix => "length-prefix", "Length-Prefix" | "char-count" | "character-count";
        /// FLAG markers with ESCAPE bytes in front of colliding payload bytes
        ByteStuffing => "byte-stuffing", "Byte-Stuffing" | "byte-insertion";
        /// FLAG markers with 9-bit substitution of colliding payload bytes
        BitStuffing => "bit-stuffing", "Bit-Stuffing" | "bit-insertion" | "char-insertion";
    }
}

scheme_enum! {
    /// Error-detecting code appended after framing
    DetectionScheme, "detection" {
        None => "none", "None" | "off";
        /// Single even-parity bit
        Parity => "parity", "Parity" | "parity-bit";
        /// 3-bit CRC with generator 1101
        Crc => "crc", "CRC" | "crc-3";
    }
}

scheme_enum! {
    /// Error-correcting code applied after detection
    CorrectionScheme, "correction" {
        None => "none", "None" | "off";
        /// Hamming(12,8), one codeword per byte
        Hamming => "hamming", "Hamming" | "hamming-12-8";
    }
}

scheme_enum! {
    /// Baseband line code
    LineCode, "line code" {
        /// 1 → +1, 0 → -1
        NrzPolar => "nrz-polar", "NRZ-Polar" | "nrz" | "polar";
        /// Two levels per bit with a mid-bit transition
        Manchester => "manchester", "Manchester";
        /// Alternate mark inversion
        Bipolar => "bipolar", "Bipolar" | "ami";
    }
}

scheme_enum! {
    /// Passband carrier modulation
    CarrierScheme, "carrier" {
        /// On/off amplitude keying
        Ask => "ask", "ASK";
        /// Two-tone frequency keying
        Fsk => "fsk", "FSK";
        /// 8-point amplitude/phase constellation, 3 levels per symbol
        Qam8 => "8-qam", "8-QAM" | "qam8" | "8qam";
    }
}

impl LineCode {
    /// Levels a well-formed signal of this code may contain
    pub fn alphabet(&self) -> &'static [Level] {
        match self {
            LineCode::NrzPolar => &[-1, 1],
            LineCode::Manchester => &[0, 1],
            LineCode::Bipolar => &[-1, 0, 1],
        }
    }

    /// Line levels emitted per input bit
    pub fn levels_per_bit(&self) -> usize {
        match self {
            LineCode::Manchester => 2,
            LineCode::NrzPolar | LineCode::Bipolar => 1,
        }
    }
}

/// One complete set of scheme choices for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemeSet {
    pub framing: FramingScheme,
    pub detection: DetectionScheme,
    pub correction: CorrectionScheme,
    pub line_code: LineCode,
    pub carrier: CarrierScheme,
}

impl SchemeSet {
    /// Every combination of the five selectors
    pub fn all() -> impl Iterator<Item = SchemeSet> {
        FramingScheme::ALL.iter().flat_map(|&framing| {
            DetectionScheme::ALL.iter().flat_map(move |&detection| {
                CorrectionScheme::ALL.iter().flat_map(move |&correction| {
                    LineCode::ALL.iter().flat_map(move |&line_code| {
                        CarrierScheme::ALL.iter().map(move |&carrier| SchemeSet {
                            framing,
                            detection,
                            correction,
                            line_code,
                            carrier,
                        })
                    })
                })
            })
        })
    }
}

impl Default for SchemeSet {
    fn default() -> Self {
        Self {
            framing: FramingScheme::LengthPrefix,
            detection: DetectionScheme::Parity,
            correction: CorrectionScheme::None,
            line_code: LineCode::NrzPolar,
            carrier: CarrierScheme::Ask,
        }
    }
}

impl fmt::Display for SchemeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {} / {}",
            self.framing, self.detection, self.correction, self.line_code, self.carrier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_display_names() {
        assert_eq!("length-prefix".parse::<FramingScheme>().unwrap(), FramingScheme::LengthPrefix);
        assert_eq!("NRZ-Polar".parse::<LineCode>().unwrap(), LineCode::NrzPolar);
        assert_eq!(" 8-QAM ".parse::<CarrierScheme>().unwrap(), CarrierScheme::Qam8);
        assert_eq!("CRC".parse::<DetectionScheme>().unwrap(), DetectionScheme::Crc);
        assert_eq!("hamming".parse::<CorrectionScheme>().unwrap(), CorrectionScheme::Hamming);
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let err = "psk".parse::<CarrierScheme>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownScheme { kind: "carrier", .. }));
        assert_eq!(err.kind(), crate::ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_names_roundtrip() {
        for scheme in LineCode::ALL {
            assert_eq!(scheme.name().parse::<LineCode>().unwrap(), *scheme);
            assert_eq!(scheme.to_string().parse::<LineCode>().unwrap(), *scheme);
        }
    }

    #[test]
    fn test_all_combinations() {
        assert_eq!(SchemeSet::all().count(), 3 * 3 * 2 * 3 * 3);
    }
}
