//! 8-point Quadrature Amplitude Modulation (8-QAM)
//!
//! Three line levels form one symbol. Levels are first reduced to bits by the
//! line code's presence convention, then each triple `(b0, b1, b2)` selects
//! amplitude `A/2` or `A` from `b0` and phase `(2·b1 + b2)·π/4`.
//!
//! The level count is rarely a multiple of three, so the modulator pads with
//! zero bits and appends one trailer symbol whose constellation index is the
//! pad count. The demodulator reads the trailer and drops the padding.

use crate::common::{Demodulator, ModulationConfig, Modulator};
use crate::{ModemError, Result};
use commsim_core::bits::{Bit, Level};
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Line levels carried by one symbol
pub const BITS_PER_SYMBOL: usize = 3;

/// Amplitude/phase pair for one constellation index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationPoint {
    pub amplitude: f64,
    pub phase: f64,
}

impl ConstellationPoint {
    /// In-phase component, `amp · cos φ`
    pub fn i(&self) -> f64 {
        self.amplitude * self.phase.cos()
    }

    /// Quadrature component, `amp · sin φ`
    pub fn q(&self) -> f64 {
        self.amplitude * self.phase.sin()
    }
}

/// The 8-point constellation table
#[derive(Debug, Clone)]
pub struct Constellation {
    points: [ConstellationPoint; 8],
}

impl Constellation {
    /// Build the table for peak amplitude `amplitude`
    pub fn new(amplitude: f64) -> Self {
        let mut points = [ConstellationPoint {
            amplitude: 0.0,
            phase: 0.0,
        }; 8];
        for (index, point) in points.iter_mut().enumerate() {
            let (b0, b1, b2) = ((index >> 2) & 1, (index >> 1) & 1, index & 1);
            point.amplitude = if b0 == 1 { amplitude } else { amplitude / 2.0 };
            point.phase = (2 * b1 + b2) as f64 * PI / 4.0;
        }
        Self { points }
    }

    /// Point for a constellation index in 0..8
    pub fn point(&self, index: usize) -> ConstellationPoint {
        self.points[index & 7]
    }

    /// Index of the point closest to `(i, q)`
    pub fn nearest(&self, i: f64, q: f64) -> usize {
        let distance = |p: &ConstellationPoint| (p.i() - i).powi(2) + (p.q() - q).powi(2);
        let mut best = 0;
        for (index, point) in self.points.iter().enumerate().skip(1) {
            if distance(point) < distance(&self.points[best]) {
                best = index;
            }
        }
        best
    }
}

/// Pack a bit triple into a constellation index
fn symbol_index(triple: &[Bit]) -> usize {
    triple.iter().fold(0, |acc, &b| (acc << 1) | usize::from(b))
}

/// 8-QAM modulator
pub struct QamModulator {
    config: ModulationConfig,
    constellation: Constellation,
}

impl QamModulator {
    /// Create a new 8-QAM modulator
    pub fn new(config: ModulationConfig) -> Self {
        let constellation = Constellation::new(config.amplitude);
        Self {
            config,
            constellation,
        }
    }

    fn push_symbol(&self, output: &mut Vec<f64>, index: usize) {
        let point = self.constellation.point(index);
        self.config.push_tone(output, 1.0, point.amplitude, point.phase);
    }
}

impl Modulator for QamModulator {
    fn modulate(&self, levels: &[Level], output: &mut Vec<f64>) -> Result<()> {
        let mut bits = Vec::with_capacity(levels.len() + BITS_PER_SYMBOL);
        for (i, &level) in levels.iter().enumerate() {
            let on = self.config.is_on(level, i).map_err(|_| ModemError::Constellation {
                symbol: i / BITS_PER_SYMBOL,
                level,
            })?;
            bits.push(Bit::from(on));
        }

        let pad = (BITS_PER_SYMBOL - bits.len() % BITS_PER_SYMBOL) % BITS_PER_SYMBOL;
        bits.resize(bits.len() + pad, 0);

        let symbols = bits.len() / BITS_PER_SYMBOL + 1;
        output.reserve(symbols * self.config.samples_per_symbol);
        for triple in bits.chunks_exact(BITS_PER_SYMBOL) {
            self.push_symbol(output, symbol_index(triple));
        }
        self.push_symbol(output, pad);

        debug!("8-QAM: {} levels, {} padding, {} symbols", levels.len(), pad, symbols);
        Ok(())
    }

    fn levels_per_symbol(&self) -> usize {
        BITS_PER_SYMBOL
    }

    fn samples_per_symbol(&self) -> usize {
        self.config.samples_per_symbol
    }
}

/// 8-QAM demodulator
pub struct QamDemodulator {
    config: ModulationConfig,
    constellation: Constellation,
}

impl QamDemodulator {
    /// Create a new 8-QAM demodulator
    pub fn new(config: ModulationConfig) -> Self {
        let constellation = Constellation::new(config.amplitude);
        Self {
            config,
            constellation,
        }
    }

    /// Recover `(I, Q)` of one symbol window
    pub fn estimate(&self, window: &[f64]) -> (f64, f64) {
        let scale = 2.0 / window.len() as f64;
        let (mut i, mut q) = (0.0, 0.0);
        for (j, s) in window.iter().enumerate() {
            let theta = self.config.phase_at(1.0, j);
            i += s * theta.sin();
            q += s * theta.cos();
        }
        (i * scale, q * scale)
    }
}

impl Demodulator for QamDemodulator {
    fn demodulate(&self, samples: &[f64], output: &mut Vec<Level>) -> Result<()> {
        let indices: Vec<usize> = self
            .config
            .windows(samples)?
            .enumerate()
            .map(|(symbol, window)| {
                let (i, q) = self.estimate(window);
                let index = self.constellation.nearest(i, q);
                trace!("8-QAM symbol {}: I {:.3} Q {:.3} -> {}", symbol, i, q, index);
                index
            })
            .collect();

        let Some((&pad, data)) = indices.split_last() else {
            return Err(ModemError::DemodulationFailed {
                msg: "8-QAM signal has no pad trailer symbol".to_string(),
            });
        };
        if pad >= BITS_PER_SYMBOL || pad > data.len() * BITS_PER_SYMBOL {
            return Err(ModemError::DemodulationFailed {
                msg: format!("8-QAM pad trailer declares {} padding bits", pad),
            });
        }

        let mut presence: Vec<bool> = data
            .iter()
            .flat_map(|&index| (0..BITS_PER_SYMBOL).rev().map(move |k| (index >> k) & 1 == 1))
            .collect();
        presence.truncate(presence.len() - pad);

        output.extend(self.config.levels_from_presence(&presence));
        Ok(())
    }
}
