//! Configuration management for commsim tools

use clap::Args;
use commsim_core::schemes::{
    CarrierScheme, CorrectionScheme, DetectionScheme, FramingScheme, LineCode, SchemeSet,
};
use serde::{Deserialize, Serialize};

/// Scheme selection and channel parameters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub framing: FramingScheme,
    pub detection: DetectionScheme,
    pub correction: CorrectionScheme,
    pub line_code: LineCode,
    pub carrier: CarrierScheme,
    /// Per-bit flip probability of the channel
    pub flip_probability: f64,
    /// Channel RNG seed, entropy when absent
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Get the five scheme selectors
    pub fn schemes(&self) -> SchemeSet {
        SchemeSet {
            framing: self.framing,
            detection: self.detection,
            correction: self.correction,
            line_code: self.line_code,
            carrier: self.carrier,
        }
    }

    /// Apply command line overrides on top of file values
    pub fn apply(&mut self, args: &SchemeArgs) {
        if let Some(framing) = args.framing {
            self.framing = framing;
        }
        if let Some(detection) = args.detection {
            self.detection = detection;
        }
        if let Some(correction) = args.correction {
            self.correction = correction;
        }
        if let Some(line_code) = args.line_code {
            self.line_code = line_code;
        }
        if let Some(carrier) = args.carrier {
            self.carrier = carrier;
        }
        if let Some(p) = args.flip_probability {
            self.flip_probability = p;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let schemes = SchemeSet::default();
        Self {
            framing: schemes.framing,
            detection: schemes.detection,
            correction: schemes.correction,
            line_code: schemes.line_code,
            carrier: schemes.carrier,
            flip_probability: 0.0,
            seed: None,
        }
    }
}

/// Scheme selection flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct SchemeArgs {
    /// Framing scheme (length-prefix, byte-stuffing, bit-stuffing)
    #[arg(long)]
    pub framing: Option<FramingScheme>,

    /// Error detection (none, parity, crc)
    #[arg(long)]
    pub detection: Option<DetectionScheme>,

    /// Error correction (none, hamming)
    #[arg(long)]
    pub correction: Option<CorrectionScheme>,

    /// Line code (nrz-polar, manchester, bipolar)
    #[arg(long)]
    pub line_code: Option<LineCode>,

    /// Carrier modulation (ask, fsk, 8-qam)
    #[arg(long)]
    pub carrier: Option<CarrierScheme>,

    /// Channel bit-flip probability in [0, 1]
    #[arg(long)]
    pub flip_probability: Option<f64>,

    /// Channel RNG seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{load_config, save_config};
    use tempfile::Builder;

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig {
            framing: FramingScheme::BitStuffing,
            detection: DetectionScheme::Crc,
            correction: CorrectionScheme::Hamming,
            line_code: LineCode::Manchester,
            carrier: CarrierScheme::Qam8,
            flip_probability: 0.01,
            seed: Some(42),
        };

        for suffix in [".toml", ".json"] {
            let temp_file = Builder::new().suffix(suffix).tempfile().unwrap();
            let path = temp_file.path().to_path_buf();

            save_config(&config, &path).unwrap();
            let loaded: PipelineConfig = load_config(&path).unwrap();
            assert_eq!(config, loaded);
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str("carrier = \"FSK\"\nseed = 3\n").unwrap();
        assert_eq!(config.carrier, CarrierScheme::Fsk);
        assert_eq!(config.framing, FramingScheme::LengthPrefix);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_unknown_scheme_in_file() {
        assert!(toml::from_str::<PipelineConfig>("carrier = \"psk\"\n").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = PipelineConfig::default();
        config.apply(&SchemeArgs {
            line_code: Some(LineCode::Bipolar),
            flip_probability: Some(0.2),
            ..SchemeArgs::default()
        });
        assert_eq!(config.line_code, LineCode::Bipolar);
        assert_eq!(config.flip_probability, 0.2);
        assert_eq!(config.detection, DetectionScheme::Parity);
    }
}
