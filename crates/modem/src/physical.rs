//! Physical-layer pipeline
//!
//! `modulate` line-codes bits and puts the levels on a carrier;
//! `demodulate` reverses both steps.

use crate::ask::{AskDemodulator, AskModulator};
use crate::common::{Demodulator, ModulationConfig, Modulator};
use crate::fsk::{FskDemodulator, FskModulator};
use crate::line;
use crate::qam::{QamDemodulator, QamModulator};
use crate::Result;
use commsim_core::bits::{Bit, Level};
use commsim_core::schemes::{CarrierScheme, LineCode};
use commsim_core::signal::{Series, SignalPlot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Both intermediate signals of one transmission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    pub levels: Vec<Level>,
    pub samples: Vec<f64>,
}

impl Transmission {
    /// Series for drawing the line signal and the carrier
    pub fn plot(&self) -> SignalPlot {
        SignalPlot {
            line: Series::step(&self.levels),
            carrier: Series::sampled(&self.samples),
        }
    }
}

/// Get the modulator for a carrier scheme
pub fn modulator_for(config: ModulationConfig, carrier: CarrierScheme) -> Box<dyn Modulator> {
    match carrier {
        CarrierScheme::Ask => Box::new(AskModulator::new(config)),
        CarrierScheme::Fsk => Box::new(FskModulator::new(config)),
        CarrierScheme::Qam8 => Box::new(QamModulator::new(config)),
    }
}

/// Get the demodulator for a carrier scheme
pub fn demodulator_for(config: ModulationConfig, carrier: CarrierScheme) -> Box<dyn Demodulator> {
    match carrier {
        CarrierScheme::Ask => Box::new(AskDemodulator::new(config)),
        CarrierScheme::Fsk => Box::new(FskDemodulator::new(config)),
        CarrierScheme::Qam8 => Box::new(QamDemodulator::new(config)),
    }
}

/// Line-code and modulate bits, returning carrier samples
pub fn modulate(line_code: LineCode, carrier: CarrierScheme, bits: &[Bit]) -> Result<Vec<f64>> {
    modulate_with_trace(line_code, carrier, bits).map(|t| t.samples)
}

/// Like [`modulate`], also keeping the line signal
pub fn modulate_with_trace(
    line_code: LineCode,
    carrier: CarrierScheme,
    bits: &[Bit],
) -> Result<Transmission> {
    let levels = line::encode(line_code, bits)?;

    let modulator = modulator_for(ModulationConfig::new(line_code), carrier);
    let symbols = levels.len().div_ceil(modulator.levels_per_symbol());
    let mut samples = Vec::with_capacity(symbols * modulator.samples_per_symbol());
    modulator.modulate(&levels, &mut samples)?;

    debug!(
        "{} over {}: {} bits -> {} levels -> {} data symbols -> {} samples",
        line_code,
        carrier,
        bits.len(),
        levels.len(),
        symbols,
        samples.len()
    );

    Ok(Transmission { levels, samples })
}

/// Demodulate carrier samples back into line levels
pub fn demodulate_levels(
    line_code: LineCode,
    carrier: CarrierScheme,
    samples: &[f64],
) -> Result<Vec<Level>> {
    let mut levels = Vec::new();
    demodulator_for(ModulationConfig::new(line_code), carrier).demodulate(samples, &mut levels)?;
    Ok(levels)
}

/// Demodulate and line-decode carrier samples into bits
pub fn demodulate(line_code: LineCode, carrier: CarrierScheme, samples: &[f64]) -> Result<Vec<Bit>> {
    let levels = demodulate_levels(line_code, carrier, samples)?;
    let bits = line::decode(line_code, &levels)?;

    debug!(
        "{} over {}: {} samples -> {} levels -> {} bits",
        line_code,
        carrier,
        samples.len(),
        levels.len(),
        bits.len()
    );

    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use commsim_core::bits::text_to_bits;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_physical_roundtrip_all_schemes() {
        let bits = text_to_bits("Hi!");
        for &line_code in LineCode::ALL {
            for &carrier in CarrierScheme::ALL {
                let samples = modulate(line_code, carrier, &bits).unwrap();
                let recovered = demodulate(line_code, carrier, &samples).unwrap();
                assert_eq!(recovered, bits, "{} over {}", line_code, carrier);
            }
        }
    }

    #[test]
    fn test_sample_counts() {
        let bits = vec![1, 0, 1, 1];
        assert_eq!(modulate(LineCode::NrzPolar, CarrierScheme::Ask, &bits).unwrap().len(), 400);
        assert_eq!(modulate(LineCode::Manchester, CarrierScheme::Fsk, &bits).unwrap().len(), 800);
        // 8 Manchester levels -> 3 symbols plus the trailer
        assert_eq!(modulate(LineCode::Manchester, CarrierScheme::Qam8, &bits).unwrap().len(), 400);
    }

    #[test]
    fn test_modulator_symbol_geometry() {
        for &carrier in CarrierScheme::ALL {
            let modulator = modulator_for(ModulationConfig::new(LineCode::NrzPolar), carrier);
            let expected = if carrier == CarrierScheme::Qam8 { 3 } else { 1 };
            assert_eq!(modulator.levels_per_symbol(), expected, "{}", carrier);
            assert_eq!(modulator.samples_per_symbol(), 100);
        }
    }

    #[test]
    fn test_trace_plot() {
        let t = modulate_with_trace(LineCode::Bipolar, CarrierScheme::Ask, &[1, 1]).unwrap();
        assert_eq!(t.levels, vec![1, -1]);
        let plot = t.plot();
        assert_eq!(plot.line.values, vec![1.0, -1.0, -1.0]);
        assert_eq!(plot.carrier.len(), 200);
    }

    #[test]
    fn test_bad_window_length() {
        let err = demodulate(LineCode::NrzPolar, CarrierScheme::Ask, &[0.0; 250]).unwrap_err();
        assert_eq!(err.kind(), commsim_core::ErrorKind::DemodulationError);
    }

    #[quickcheck]
    fn prop_physical_roundtrip(raw: Vec<bool>) -> bool {
        let bits: Vec<Bit> = raw.into_iter().take(64).map(Bit::from).collect();
        LineCode::ALL.iter().all(|&line_code| {
            CarrierScheme::ALL.iter().all(|&carrier| {
                modulate(line_code, carrier, &bits)
                    .and_then(|s| demodulate(line_code, carrier, &s))
                    .map(|b| b == bits)
                    .unwrap_or(false)
            })
        })
    }
}
