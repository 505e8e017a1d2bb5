//! Common modulation traits and utilities

use crate::{ModemError, Result};
use commsim_core::bits::Level;
use commsim_core::schemes::LineCode;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Peak carrier amplitude
pub const AMPLITUDE: f64 = 1.0;

/// Samples emitted for every symbol
pub const SAMPLES_PER_SYMBOL: usize = 100;

/// ASK carrier frequency, in cycles per symbol
pub const ASK_FREQUENCY: f64 = 1.0;

/// FSK tone for "on" levels, in cycles per symbol
pub const FSK_MARK_FREQUENCY: f64 = 1.0;

/// FSK tone for "off" levels, in cycles per symbol
pub const FSK_SPACE_FREQUENCY: f64 = 3.0;

/// Generic modulator trait
pub trait Modulator {
    /// Modulate line levels into carrier samples
    fn modulate(&self, levels: &[Level], output: &mut Vec<f64>) -> Result<()>;

    /// Get line levels carried by one symbol
    fn levels_per_symbol(&self) -> usize;

    /// Get samples per symbol
    fn samples_per_symbol(&self) -> usize;
}

/// Generic demodulator trait
pub trait Demodulator {
    /// Demodulate carrier samples back into line levels
    fn demodulate(&self, samples: &[f64], output: &mut Vec<Level>) -> Result<()>;
}

/// Common modulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulationConfig {
    pub line_code: LineCode,
    pub amplitude: f64,
    pub samples_per_symbol: usize,
}

impl ModulationConfig {
    /// Create a configuration with the stack's fixed carrier parameters
    pub fn new(line_code: LineCode) -> Self {
        Self {
            line_code,
            amplitude: AMPLITUDE,
            samples_per_symbol: SAMPLES_PER_SYMBOL,
        }
    }

    /// Set peak amplitude
    pub fn with_amplitude(mut self, amplitude: f64) -> Result<Self> {
        if !amplitude.is_finite() || amplitude <= 0.0 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid amplitude: {}", amplitude),
            });
        }
        self.amplitude = amplitude;
        Ok(self)
    }

    /// Set samples per symbol
    pub fn with_samples_per_symbol(mut self, samples: usize) -> Result<Self> {
        if samples < 4 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Too few samples per symbol: {}", samples),
            });
        }
        self.samples_per_symbol = samples;
        Ok(self)
    }

    /// Phase of sample `j` for a tone of `frequency` cycles per symbol
    pub fn phase_at(&self, frequency: f64, j: usize) -> f64 {
        2.0 * PI * frequency * j as f64 / self.samples_per_symbol as f64
    }

    /// Append one symbol of `amplitude · sin(2π f j / N + phase)`
    pub fn push_tone(&self, output: &mut Vec<f64>, frequency: f64, amplitude: f64, phase: f64) {
        output.extend(
            (0..self.samples_per_symbol).map(|j| amplitude * (self.phase_at(frequency, j) + phase).sin()),
        );
    }

    /// Append one silent symbol
    pub fn push_silence(&self, output: &mut Vec<f64>) {
        output.extend(std::iter::repeat(0.0).take(self.samples_per_symbol));
    }

    /// Split samples into whole symbol windows
    pub fn windows<'a>(&self, samples: &'a [f64]) -> Result<std::slice::ChunksExact<'a, f64>> {
        if samples.len() % self.samples_per_symbol != 0 {
            return Err(ModemError::DemodulationFailed {
                msg: format!(
                    "{} samples is not a multiple of {} per symbol",
                    samples.len(),
                    self.samples_per_symbol
                ),
            });
        }
        Ok(samples.chunks_exact(self.samples_per_symbol))
    }

    /// Whether `level` counts as carrier presence under this line code
    pub fn is_on(&self, level: Level, index: usize) -> Result<bool> {
        if !self.line_code.alphabet().contains(&level) {
            return Err(ModemError::LevelOutOfAlphabet {
                line_code: self.line_code,
                level,
                index,
            });
        }
        Ok(match self.line_code {
            LineCode::NrzPolar => level > 0,
            LineCode::Manchester => level == 1,
            LineCode::Bipolar => level != 0,
        })
    }

    /// Map detected presence back to line levels
    pub fn levels_from_presence(&self, presence: &[bool]) -> Vec<Level> {
        match self.line_code {
            LineCode::NrzPolar => presence.iter().map(|&on| if on { 1 } else { -1 }).collect(),
            LineCode::Manchester => presence.iter().map(|&on| Level::from(on)).collect(),
            LineCode::Bipolar => {
                let mut polarity: Level = 1;
                presence
                    .iter()
                    .map(|&on| {
                        if on {
                            let level = polarity;
                            polarity = -polarity;
                            level
                        } else {
                            0
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Inner product of a window with `amplitude · sin(2π f j / N)`
pub fn correlate(config: &ModulationConfig, window: &[f64], frequency: f64, amplitude: f64) -> f64 {
    window
        .iter()
        .enumerate()
        .map(|(j, s)| s * amplitude * config.phase_at(frequency, j).sin())
        .sum()
}
