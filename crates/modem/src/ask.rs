//! Amplitude Shift Keying (ASK) implementation

use crate::common::{Demodulator, ModulationConfig, Modulator, ASK_FREQUENCY};
use crate::{ModemError, Result};
use commsim_core::bits::Level;
use tracing::trace;

/// ASK modulator
pub struct AskModulator {
    config: ModulationConfig,
}

impl AskModulator {
    /// Create a new ASK modulator
    pub fn new(config: ModulationConfig) -> Self {
        Self { config }
    }
}

impl Modulator for AskModulator {
    fn modulate(&self, levels: &[Level], output: &mut Vec<f64>) -> Result<()> {
        output.reserve(levels.len() * self.config.samples_per_symbol);

        for (i, &level) in levels.iter().enumerate() {
            if self.config.is_on(level, i)? {
                self.config.push_tone(output, ASK_FREQUENCY, self.config.amplitude, 0.0);
            } else {
                self.config.push_silence(output);
            }
        }

        Ok(())
    }

    fn levels_per_symbol(&self) -> usize {
        1
    }

    fn samples_per_symbol(&self) -> usize {
        self.config.samples_per_symbol
    }
}

/// ASK demodulator.
///
/// A window is "on" when its mean absolute sample exceeds A/2 and "off" below
/// A/4. Anything in between cannot be attributed to either and fails.
pub struct AskDemodulator {
    config: ModulationConfig,
}

impl AskDemodulator {
    /// Create a new ASK demodulator
    pub fn new(config: ModulationConfig) -> Self {
        Self { config }
    }

    fn on_threshold(&self) -> f64 {
        self.config.amplitude / 2.0
    }

    fn off_threshold(&self) -> f64 {
        self.config.amplitude / 4.0
    }
}

impl Demodulator for AskDemodulator {
    fn demodulate(&self, samples: &[f64], output: &mut Vec<Level>) -> Result<()> {
        let mut presence = Vec::with_capacity(samples.len() / self.config.samples_per_symbol);

        for (window, chunk) in self.config.windows(samples)?.enumerate() {
            let amplitude = chunk.iter().map(|s| s.abs()).sum::<f64>() / chunk.len() as f64;
            trace!("ASK window {}: mean amplitude {:.4}", window, amplitude);

            if amplitude > self.on_threshold() {
                presence.push(true);
            } else if amplitude < self.off_threshold() {
                presence.push(false);
            } else {
                return Err(ModemError::AmbiguousAmplitude { window, amplitude });
            }
        }

        output.extend(self.config.levels_from_presence(&presence));
        Ok(())
    }
}
