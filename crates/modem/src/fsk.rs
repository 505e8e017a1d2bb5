//! Frequency Shift Keying (FSK) implementation

use crate::common::{
    correlate, Demodulator, ModulationConfig, Modulator, FSK_MARK_FREQUENCY, FSK_SPACE_FREQUENCY,
};
use crate::Result;
use commsim_core::bits::Level;
use tracing::trace;

/// FSK modulator
pub struct FskModulator {
    config: ModulationConfig,
    freq_mark: f64,  // Tone for "on" levels
    freq_space: f64, // Tone for "off" levels
}

impl FskModulator {
    /// Create a new FSK modulator
    pub fn new(config: ModulationConfig) -> Self {
        Self {
            config,
            freq_mark: FSK_MARK_FREQUENCY,
            freq_space: FSK_SPACE_FREQUENCY,
        }
    }
}

impl Modulator for FskModulator {
    fn modulate(&self, levels: &[Level], output: &mut Vec<f64>) -> Result<()> {
        output.reserve(levels.len() * self.config.samples_per_symbol);

        for (i, &level) in levels.iter().enumerate() {
            let freq = if self.config.is_on(level, i)? {
                self.freq_mark
            } else {
                self.freq_space
            };
            self.config.push_tone(output, freq, self.config.amplitude, 0.0);
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

/// FSK demodulator
pub struct FskDemodulator {
    config: ModulationConfig,
    freq_mark: f64,
    freq_space: f64,
}

impl FskDemodulator {
    /// Create a new FSK demodulator
    pub fn new(config: ModulationConfig) -> Self {
        Self {
            config,
            freq_mark: FSK_MARK_FREQUENCY,
            freq_space: FSK_SPACE_FREQUENCY,
        }
    }
}

impl Demodulator for FskDemodulator {
    fn demodulate(&self, samples: &[f64], output: &mut Vec<Level>) -> Result<()> {
        let amplitude = self.config.amplitude;
        let presence: Vec<bool> = self
            .config
            .windows(samples)?
            .enumerate()
            .map(|(window, chunk)| {
                // Coherent correlation against each tone; ties resolve to space
                let e_mark = correlate(&self.config, chunk, self.freq_mark, amplitude);
                let e_space = correlate(&self.config, chunk, self.freq_space, amplitude);
                trace!("FSK window {}: mark {:.3} space {:.3}", window, e_mark, e_space);
                e_mark > e_space
            })
            .collect();

        output.extend(self.config.levels_from_presence(&presence));
        Ok(())
    }
}
